//! Asset (node) in the relationship graph.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::{
    optional_finite, optional_non_negative, require_currency, require_non_empty,
    require_non_negative, ValidationError,
};
use super::{attributes, AttributeMap, Value};

/// Currency assumed when a builder is not told otherwise.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Dense arena index assigned to an asset at insertion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetIdx(pub u32);

impl AssetIdx {
    #[inline]
    pub fn index(self) -> usize { self.0 as usize }
}

impl fmt::Display for AssetIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Broad instrument classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Equity,
    FixedIncome,
    Commodity,
    Currency,
    Derivative,
    RealEstate,
    Alternative,
}

impl AssetClass {
    pub const ALL: [AssetClass; 7] = [
        AssetClass::Equity,
        AssetClass::FixedIncome,
        AssetClass::Commodity,
        AssetClass::Currency,
        AssetClass::Derivative,
        AssetClass::RealEstate,
        AssetClass::Alternative,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AssetClass::Equity => "equity",
            AssetClass::FixedIncome => "fixed_income",
            AssetClass::Commodity => "commodity",
            AssetClass::Currency => "currency",
            AssetClass::Derivative => "derivative",
            AssetClass::RealEstate => "real_estate",
            AssetClass::Alternative => "alternative",
        }
    }

    /// Stable position in [`AssetClass::ALL`], used to place class clusters.
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Node color for this class.
    pub fn color(self) -> &'static str {
        match self {
            AssetClass::Equity => "#1f77b4",
            AssetClass::FixedIncome => "#2ca02c",
            AssetClass::Commodity => "#ff7f0e",
            AssetClass::Currency => "#d62728",
            AssetClass::Derivative => "#9467bd",
            AssetClass::RealEstate => "#8c564b",
            AssetClass::Alternative => "#e377c2",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subtype-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssetKind {
    Equity {
        pe_ratio: Option<f64>,
        dividend_yield: Option<f64>,
        earnings_per_share: Option<f64>,
        book_value: Option<f64>,
    },
    Bond {
        yield_rate: Option<f64>,
        coupon_rate: Option<f64>,
        maturity_date: Option<NaiveDate>,
        duration: Option<f64>,
        credit_rating: Option<String>,
        /// Id of the issuing equity, if this is a corporate bond.
        issuer_id: Option<String>,
    },
    Commodity {
        futures_price: Option<f64>,
        contract_size: Option<f64>,
        delivery_date: Option<NaiveDate>,
    },
    Currency {
        exchange_rate: Option<f64>,
        country: Option<String>,
        central_bank_rate: Option<f64>,
    },
    Other,
}

impl AssetKind {
    fn name(&self) -> &'static str {
        match self {
            AssetKind::Equity { .. } => "equity",
            AssetKind::Bond { .. } => "bond",
            AssetKind::Commodity { .. } => "commodity",
            AssetKind::Currency { .. } => "currency",
            AssetKind::Other => "other",
        }
    }

    fn matches(&self, class: AssetClass) -> bool {
        match self {
            AssetKind::Equity { .. } => class == AssetClass::Equity,
            AssetKind::Bond { .. } => class == AssetClass::FixedIncome,
            AssetKind::Commodity { .. } => class == AssetClass::Commodity,
            AssetKind::Currency { .. } => class == AssetClass::Currency,
            AssetKind::Other => true,
        }
    }
}

/// A financial instrument in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub asset_class: AssetClass,
    /// Free-form sector; blank means "unclassified" and opts out of sector rules.
    pub sector: String,
    pub price: f64,
    pub currency: String,
    pub market_cap: Option<f64>,
    pub kind: AssetKind,
    #[serde(default)]
    pub additional_fields: AttributeMap,
}

impl Asset {
    pub fn equity(id: impl Into<String>, symbol: impl Into<String>, name: impl Into<String>, sector: impl Into<String>, price: f64) -> AssetBuilder {
        AssetBuilder::new(id, symbol, name, AssetClass::Equity, sector, price, AssetKind::Equity {
            pe_ratio: None,
            dividend_yield: None,
            earnings_per_share: None,
            book_value: None,
        })
    }

    pub fn bond(id: impl Into<String>, symbol: impl Into<String>, name: impl Into<String>, sector: impl Into<String>, price: f64) -> AssetBuilder {
        AssetBuilder::new(id, symbol, name, AssetClass::FixedIncome, sector, price, AssetKind::Bond {
            yield_rate: None,
            coupon_rate: None,
            maturity_date: None,
            duration: None,
            credit_rating: None,
            issuer_id: None,
        })
    }

    pub fn commodity(id: impl Into<String>, symbol: impl Into<String>, name: impl Into<String>, sector: impl Into<String>, price: f64) -> AssetBuilder {
        AssetBuilder::new(id, symbol, name, AssetClass::Commodity, sector, price, AssetKind::Commodity {
            futures_price: None,
            contract_size: None,
            delivery_date: None,
        })
    }

    /// Currency asset standing for `currency` (an ISO 4217 code); there is
    /// no default, so a Currency asset never silently means USD.
    pub fn currency(id: impl Into<String>, symbol: impl Into<String>, name: impl Into<String>, currency: impl Into<String>, price: f64) -> AssetBuilder {
        AssetBuilder::new(id, symbol, name, AssetClass::Currency, "Forex", price, AssetKind::Currency {
            exchange_rate: None,
            country: None,
            central_bank_rate: None,
        })
        .with_currency(currency)
    }

    /// Asset of a class without subtype fields (derivatives, real estate, alternatives).
    pub fn other(id: impl Into<String>, symbol: impl Into<String>, name: impl Into<String>, class: AssetClass, sector: impl Into<String>, price: f64) -> AssetBuilder {
        AssetBuilder::new(id, symbol, name, class, sector, price, AssetKind::Other)
    }

    /// Check every field invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("id", &self.id)?;
        require_non_empty("symbol", &self.symbol)?;
        require_non_negative("price", self.price)?;
        require_currency(&self.currency)?;
        optional_non_negative("market_cap", self.market_cap)?;

        if !self.kind.matches(self.asset_class) {
            return Err(ValidationError::KindMismatch {
                class: self.asset_class.as_str(),
                kind: self.kind.name(),
            });
        }

        match &self.kind {
            AssetKind::Equity { pe_ratio, dividend_yield, earnings_per_share, book_value } => {
                optional_finite("pe_ratio", *pe_ratio)?;
                optional_non_negative("dividend_yield", *dividend_yield)?;
                optional_finite("earnings_per_share", *earnings_per_share)?;
                optional_finite("book_value", *book_value)?;
            }
            AssetKind::Bond { yield_rate, coupon_rate, duration, issuer_id, .. } => {
                optional_non_negative("yield_rate", *yield_rate)?;
                optional_non_negative("coupon_rate", *coupon_rate)?;
                optional_non_negative("duration", *duration)?;
                if let Some(issuer) = issuer_id {
                    require_non_empty("issuer_id", issuer)?;
                }
            }
            AssetKind::Commodity { futures_price, contract_size, .. } => {
                optional_non_negative("futures_price", *futures_price)?;
                optional_non_negative("contract_size", *contract_size)?;
            }
            AssetKind::Currency { exchange_rate, central_bank_rate, .. } => {
                if let Some(rate) = *exchange_rate {
                    if !rate.is_finite() {
                        return Err(ValidationError::NonFiniteValue { field: "exchange_rate", value: rate });
                    }
                    if rate <= 0.0 {
                        return Err(ValidationError::NonPositiveValue { field: "exchange_rate", value: rate });
                    }
                }
                optional_finite("central_bank_rate", *central_bank_rate)?;
            }
            AssetKind::Other => {}
        }

        for (key, value) in &self.additional_fields {
            if key.trim().is_empty() {
                return Err(ValidationError::EmptyAttributeKey);
            }
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteAttribute { key: key.clone() });
            }
        }
        Ok(())
    }

    pub fn is_equity(&self) -> bool { matches!(self.kind, AssetKind::Equity { .. }) }
    pub fn is_bond(&self) -> bool { matches!(self.kind, AssetKind::Bond { .. }) }
    pub fn is_commodity(&self) -> bool { matches!(self.kind, AssetKind::Commodity { .. }) }
    pub fn is_currency(&self) -> bool { matches!(self.kind, AssetKind::Currency { .. }) }

    /// Trimmed sector, or `None` when the asset is unclassified.
    pub fn sector(&self) -> Option<&str> {
        let s = self.sector.trim();
        (!s.is_empty()).then_some(s)
    }

    pub fn dividend_yield(&self) -> Option<f64> {
        match self.kind {
            AssetKind::Equity { dividend_yield, .. } => dividend_yield,
            _ => None,
        }
    }

    pub fn yield_rate(&self) -> Option<f64> {
        match self.kind {
            AssetKind::Bond { yield_rate, .. } => yield_rate,
            _ => None,
        }
    }

    pub fn issuer_id(&self) -> Option<&str> {
        match &self.kind {
            AssetKind::Bond { issuer_id, .. } => issuer_id.as_deref(),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.additional_fields.get(key)
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Fluent constructor for [`Asset`]; `build()` runs validation.
#[derive(Debug, Clone)]
pub struct AssetBuilder {
    asset: Asset,
}

impl AssetBuilder {
    fn new(
        id: impl Into<String>,
        symbol: impl Into<String>,
        name: impl Into<String>,
        asset_class: AssetClass,
        sector: impl Into<String>,
        price: f64,
        kind: AssetKind,
    ) -> Self {
        Self {
            asset: Asset {
                id: id.into(),
                symbol: symbol.into(),
                name: name.into(),
                asset_class,
                sector: sector.into(),
                price,
                currency: DEFAULT_CURRENCY.to_string(),
                market_cap: None,
                kind,
                additional_fields: AttributeMap::new(),
            },
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.asset.currency = currency.into();
        self
    }

    pub fn with_market_cap(mut self, market_cap: f64) -> Self {
        self.asset.market_cap = Some(market_cap);
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.asset.additional_fields.insert(key.into(), value.into());
        self
    }

    pub fn with_fields<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.asset.additional_fields.extend(attributes(pairs));
        self
    }

    pub fn with_pe_ratio(mut self, value: f64) -> Self {
        if let AssetKind::Equity { pe_ratio, .. } = &mut self.asset.kind {
            *pe_ratio = Some(value);
        }
        self
    }

    pub fn with_dividend_yield(mut self, value: f64) -> Self {
        if let AssetKind::Equity { dividend_yield, .. } = &mut self.asset.kind {
            *dividend_yield = Some(value);
        }
        self
    }

    pub fn with_earnings_per_share(mut self, value: f64) -> Self {
        if let AssetKind::Equity { earnings_per_share, .. } = &mut self.asset.kind {
            *earnings_per_share = Some(value);
        }
        self
    }

    pub fn with_book_value(mut self, value: f64) -> Self {
        if let AssetKind::Equity { book_value, .. } = &mut self.asset.kind {
            *book_value = Some(value);
        }
        self
    }

    pub fn with_yield_rate(mut self, value: f64) -> Self {
        if let AssetKind::Bond { yield_rate, .. } = &mut self.asset.kind {
            *yield_rate = Some(value);
        }
        self
    }

    pub fn with_coupon_rate(mut self, value: f64) -> Self {
        if let AssetKind::Bond { coupon_rate, .. } = &mut self.asset.kind {
            *coupon_rate = Some(value);
        }
        self
    }

    pub fn with_maturity_date(mut self, value: NaiveDate) -> Self {
        if let AssetKind::Bond { maturity_date, .. } = &mut self.asset.kind {
            *maturity_date = Some(value);
        }
        self
    }

    pub fn with_duration(mut self, value: f64) -> Self {
        if let AssetKind::Bond { duration, .. } = &mut self.asset.kind {
            *duration = Some(value);
        }
        self
    }

    pub fn with_credit_rating(mut self, value: impl Into<String>) -> Self {
        if let AssetKind::Bond { credit_rating, .. } = &mut self.asset.kind {
            *credit_rating = Some(value.into());
        }
        self
    }

    pub fn with_issuer(mut self, value: impl Into<String>) -> Self {
        if let AssetKind::Bond { issuer_id, .. } = &mut self.asset.kind {
            *issuer_id = Some(value.into());
        }
        self
    }

    pub fn with_futures_price(mut self, value: f64) -> Self {
        if let AssetKind::Commodity { futures_price, .. } = &mut self.asset.kind {
            *futures_price = Some(value);
        }
        self
    }

    pub fn with_contract_size(mut self, value: f64) -> Self {
        if let AssetKind::Commodity { contract_size, .. } = &mut self.asset.kind {
            *contract_size = Some(value);
        }
        self
    }

    pub fn with_delivery_date(mut self, value: NaiveDate) -> Self {
        if let AssetKind::Commodity { delivery_date, .. } = &mut self.asset.kind {
            *delivery_date = Some(value);
        }
        self
    }

    pub fn with_exchange_rate(mut self, value: f64) -> Self {
        if let AssetKind::Currency { exchange_rate, .. } = &mut self.asset.kind {
            *exchange_rate = Some(value);
        }
        self
    }

    pub fn with_country(mut self, value: impl Into<String>) -> Self {
        if let AssetKind::Currency { country, .. } = &mut self.asset.kind {
            *country = Some(value.into());
        }
        self
    }

    pub fn with_central_bank_rate(mut self, value: f64) -> Self {
        if let AssetKind::Currency { central_bank_rate, .. } = &mut self.asset.kind {
            *central_bank_rate = Some(value);
        }
        self
    }

    pub fn build(self) -> Result<Asset, ValidationError> {
        self.asset.validate()?;
        Ok(self.asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_equity() {
        let aapl = Asset::equity("AAPL", "AAPL", "Apple Inc.", "Technology", 150.0)
            .with_market_cap(2.4e12)
            .with_pe_ratio(28.5)
            .with_dividend_yield(0.005)
            .build()
            .unwrap();
        assert_eq!(aapl.asset_class, AssetClass::Equity);
        assert_eq!(aapl.currency, "USD");
        assert_eq!(aapl.dividend_yield(), Some(0.005));
        assert_eq!(aapl.yield_rate(), None);
        assert!(aapl.is_equity());
    }

    #[test]
    fn test_negative_price_rejected() {
        let err = Asset::equity("X", "X", "X", "Tech", -1.0).build().unwrap_err();
        assert_eq!(err, ValidationError::NegativeValue { field: "price", value: -1.0 });
    }

    #[test]
    fn test_bad_currency_rejected() {
        let err = Asset::equity("X", "X", "X", "Tech", 1.0)
            .with_currency("usd")
            .build()
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidCurrency { .. }));
    }

    #[test]
    fn test_nan_attribute_rejected() {
        let err = Asset::commodity("GC", "GC", "Gold", "Precious Metals", 1900.0)
            .with_field("volatility", f64::NAN)
            .build()
            .unwrap_err();
        assert_eq!(err, ValidationError::NonFiniteAttribute { key: "volatility".into() });
    }

    #[test]
    fn test_setters_ignore_other_kinds() {
        let gold = Asset::commodity("GC", "GC", "Gold", "Precious Metals", 1900.0)
            .with_yield_rate(0.05)
            .build()
            .unwrap();
        assert_eq!(gold.yield_rate(), None);
    }

    #[test]
    fn test_kind_must_match_class() {
        let mut eq = Asset::equity("X", "X", "X", "Tech", 1.0).build().unwrap();
        eq.asset_class = AssetClass::Currency;
        assert!(matches!(eq.validate(), Err(ValidationError::KindMismatch { .. })));
    }

    #[test]
    fn test_exchange_rate_must_be_positive() {
        let err = Asset::currency("EUR", "EURUSD", "Euro", "EUR", 1.08)
            .with_exchange_rate(0.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, ValidationError::NonPositiveValue { field: "exchange_rate", .. }));
    }

    #[test]
    fn test_currency_asset_represents_its_currency() {
        let eur = Asset::currency("EUR", "EURUSD", "Euro", "EUR", 1.08).build().unwrap();
        assert_eq!(eur.currency, "EUR");
        assert_eq!(eur.sector(), Some("Forex"));

        let err = Asset::currency("XXX", "XXX", "Bad", "euro", 1.0).build().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidCurrency { .. }));
    }

    #[test]
    fn test_blank_sector_is_unclassified() {
        let a = Asset::equity("X", "X", "X", "   ", 1.0).build().unwrap();
        assert_eq!(a.sector(), None);
    }
}
