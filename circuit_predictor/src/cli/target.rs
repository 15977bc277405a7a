use thiserror::Error;

use crate::config::Watchlist;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("unknown watchlist name '{0}'")]
    UnknownName(String),
    #[error("symbol must not be empty")]
    EmptySymbol,
}

/// A resolved stock to forecast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub symbol: String,
    /// Watchlist display name, when the symbol is on the list.
    pub name: Option<String>,
}

/// Turns `--symbol` / `--name` into a ticker.
///
/// With neither flag the first watchlist entry is used, the way the dashboard
/// opens on its first stock.
pub fn resolve_target(
    symbol: Option<&str>,
    name: Option<&str>,
    watchlist: &Watchlist,
) -> Result<Target, TargetError> {
    if let Some(symbol) = symbol {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(TargetError::EmptySymbol);
        }
        return Ok(Target {
            name: watchlist.name_for(&symbol).map(str::to_string),
            symbol,
        });
    }

    match name {
        Some(name) => watchlist
            .symbol_for(name.trim())
            .map(|symbol| Target {
                symbol: symbol.to_string(),
                name: watchlist.name_for(symbol).map(str::to_string),
            })
            .ok_or_else(|| TargetError::UnknownName(name.to_string())),
        None => watchlist
            .iter()
            .next()
            .map(|(name, symbol)| Target {
                symbol: symbol.to_string(),
                name: Some(name.to_string()),
            })
            .ok_or_else(|| TargetError::UnknownName(String::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_is_normalised_and_named() {
        let wl = Watchlist::default();
        let t = resolve_target(Some(" tcs.ns "), None, &wl).unwrap();
        assert_eq!(t.symbol, "TCS.NS");
        assert_eq!(t.name.as_deref(), Some("TCS"));
    }

    #[test]
    fn unlisted_symbol_has_no_name() {
        let t = resolve_target(Some("AAPL"), None, &Watchlist::default()).unwrap();
        assert_eq!(t.name, None);
    }

    #[test]
    fn name_lookup_is_case_insensitive() {
        let t = resolve_target(None, Some("infosys"), &Watchlist::default()).unwrap();
        assert_eq!(t.symbol, "INFY.NS");
        assert_eq!(t.name.as_deref(), Some("Infosys"));
    }

    #[test]
    fn unknown_name_is_an_error() {
        assert_eq!(
            resolve_target(None, Some("Nope Ltd"), &Watchlist::default()),
            Err(TargetError::UnknownName("Nope Ltd".to_string()))
        );
    }

    #[test]
    fn defaults_to_first_watchlist_entry() {
        let t = resolve_target(None, None, &Watchlist::default()).unwrap();
        assert_eq!(t.symbol, "RELIANCE.NS");
    }

    #[test]
    fn blank_symbol_is_rejected() {
        assert_eq!(
            resolve_target(Some("  "), None, &Watchlist::default()),
            Err(TargetError::EmptySymbol)
        );
    }
}
