//! Caller-supplied layouts: coercion and fail-fast validation.
//!
//! A layout handed in from outside (a cached layout, a layout computed by a
//! front end, a JSON request body) is checked completely before any
//! geometry is computed. Checks run in a fixed order so the first problem
//! reported is always the same one:
//!
//! 1. missing positions / missing asset ids
//! 2. container types (positions must be rows, ids must be a list)
//! 3. row count vs id count
//! 4. per row: shape `(n, 3)`, numeric elements, finite elements
//! 5. per id: string, non-blank, unique

use hashbrown::HashSet;

use serde_json::Value as Json;
use thiserror::Error;

/// Whether an error is about a bad value or a bad type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutErrorKind {
    Value,
    Type,
}

/// Why a caller-supplied layout was rejected.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    #[error("positions must be provided")]
    MissingPositions,

    #[error("asset_ids must be provided")]
    MissingAssetIds,

    #[error("positions must be an array of [x, y, z] rows, got {got}")]
    PositionsNotArray { got: &'static str },

    #[error("asset_ids must be an array of strings, got {got}")]
    AssetIdsNotArray { got: &'static str },

    #[error("positions has {positions} rows but asset_ids has {asset_ids} entries")]
    LengthMismatch { positions: usize, asset_ids: usize },

    #[error("positions must have shape (n, 3); row {row} has {len} columns")]
    BadShape { row: usize, len: usize },

    #[error("position [{row}][{col}] is not numeric: {got}")]
    NonNumeric { row: usize, col: usize, got: String },

    #[error("position [{row}][{col}] must be finite, got {value}")]
    NonFinite { row: usize, col: usize, value: f64 },

    #[error("asset_ids[{index}] is empty")]
    EmptyAssetId { index: usize },

    #[error("asset_ids[{index}] must be a string, got {got}")]
    NonStringAssetId { index: usize, got: &'static str },

    #[error("asset id '{id}' appears more than once in asset_ids")]
    DuplicateAssetId { id: String },
}

impl LayoutError {
    pub fn kind(&self) -> LayoutErrorKind {
        match self {
            LayoutError::PositionsNotArray { .. }
            | LayoutError::AssetIdsNotArray { .. }
            | LayoutError::NonNumeric { .. }
            | LayoutError::NonStringAssetId { .. } => LayoutErrorKind::Type,
            _ => LayoutErrorKind::Value,
        }
    }
}

/// A validated `(positions, asset_ids)` pair: `n` finite 3D points and `n`
/// distinct, non-blank ids.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecomputedLayout {
    positions: Vec<[f64; 3]>,
    asset_ids: Vec<String>,
}

impl PrecomputedLayout {
    /// From typed rows.
    pub fn new(positions: Option<Vec<[f64; 3]>>, asset_ids: Option<Vec<String>>) -> Result<Self, LayoutError> {
        let positions = positions.ok_or(LayoutError::MissingPositions)?;
        let asset_ids = asset_ids.ok_or(LayoutError::MissingAssetIds)?;
        check_lengths(positions.len(), asset_ids.len())?;
        for (row, p) in positions.iter().enumerate() {
            check_finite(row, p)?;
        }
        check_ids(&asset_ids)?;
        Ok(Self { positions, asset_ids })
    }

    /// From a plain nested list; rows are coerced to `[f64; 3]`.
    pub fn from_nested(positions: Option<Vec<Vec<f64>>>, asset_ids: Option<Vec<String>>) -> Result<Self, LayoutError> {
        let rows = positions.ok_or(LayoutError::MissingPositions)?;
        let asset_ids = asset_ids.ok_or(LayoutError::MissingAssetIds)?;
        check_lengths(rows.len(), asset_ids.len())?;
        let mut positions = Vec::with_capacity(rows.len());
        for (row, values) in rows.iter().enumerate() {
            let p = to_point(row, values)?;
            check_finite(row, &p)?;
            positions.push(p);
        }
        check_ids(&asset_ids)?;
        Ok(Self { positions, asset_ids })
    }

    /// From untyped JSON, as an API layer would receive it. Numbers and
    /// numeric strings are accepted as coordinates.
    pub fn from_json(positions: &Json, asset_ids: &Json) -> Result<Self, LayoutError> {
        if positions.is_null() {
            return Err(LayoutError::MissingPositions);
        }
        if asset_ids.is_null() {
            return Err(LayoutError::MissingAssetIds);
        }
        let rows = positions
            .as_array()
            .ok_or(LayoutError::PositionsNotArray { got: json_type(positions) })?;
        let ids = asset_ids
            .as_array()
            .ok_or(LayoutError::AssetIdsNotArray { got: json_type(asset_ids) })?;
        check_lengths(rows.len(), ids.len())?;

        let mut coerced = Vec::with_capacity(rows.len());
        for (row, value) in rows.iter().enumerate() {
            let cells = match value {
                Json::Array(cells) => cells.as_slice(),
                _ => return Err(LayoutError::BadShape { row, len: 1 }),
            };
            if cells.len() != 3 {
                return Err(LayoutError::BadShape { row, len: cells.len() });
            }
            let mut p = [0.0; 3];
            for (col, cell) in cells.iter().enumerate() {
                p[col] = json_number(row, col, cell)?;
            }
            check_finite(row, &p)?;
            coerced.push(p);
        }

        let mut names = Vec::with_capacity(ids.len());
        for (index, id) in ids.iter().enumerate() {
            match id {
                Json::String(s) => names.push(s.clone()),
                other => return Err(LayoutError::NonStringAssetId { index, got: json_type(other) }),
            }
        }
        check_ids(&names)?;
        Ok(Self { positions: coerced, asset_ids: names })
    }

    pub fn positions(&self) -> &[[f64; 3]] {
        &self.positions
    }

    pub fn asset_ids(&self) -> &[String] {
        &self.asset_ids
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub(crate) fn into_parts(self) -> (Vec<[f64; 3]>, Vec<String>) {
        (self.positions, self.asset_ids)
    }
}

fn check_lengths(positions: usize, asset_ids: usize) -> Result<(), LayoutError> {
    if positions != asset_ids {
        return Err(LayoutError::LengthMismatch { positions, asset_ids });
    }
    Ok(())
}

fn to_point(row: usize, values: &[f64]) -> Result<[f64; 3], LayoutError> {
    <[f64; 3]>::try_from(values).map_err(|_| LayoutError::BadShape { row, len: values.len() })
}

fn check_finite(row: usize, p: &[f64; 3]) -> Result<(), LayoutError> {
    match p.iter().position(|v| !v.is_finite()) {
        Some(col) => Err(LayoutError::NonFinite { row, col, value: p[col] }),
        None => Ok(()),
    }
}

fn check_ids(ids: &[String]) -> Result<(), LayoutError> {
    let mut seen = HashSet::with_capacity(ids.len());
    for (index, id) in ids.iter().enumerate() {
        if id.trim().is_empty() {
            return Err(LayoutError::EmptyAssetId { index });
        }
        if !seen.insert(id.as_str()) {
            return Err(LayoutError::DuplicateAssetId { id: id.clone() });
        }
    }
    Ok(())
}

fn json_number(row: usize, col: usize, cell: &Json) -> Result<f64, LayoutError> {
    let non_numeric = || LayoutError::NonNumeric { row, col, got: cell.to_string() };
    match cell {
        Json::Number(n) => n.as_f64().ok_or_else(non_numeric),
        Json::String(s) => s.trim().parse::<f64>().map_err(|_| non_numeric()),
        _ => Err(non_numeric()),
    }
}

fn json_type(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
