//! Deriving node names from display symbols.
//!
//! Node labels are usually TeX math such as `$\tilde{X}_{i,j}$`, while the
//! rendering backend needs a plain identifier to connect edges. The rules
//! below turn the former into the latter, in this order:
//!
//! 1. A decorated symbol (`$\tilde{X}_i`) moves the decoration behind the
//!    base: `X_tilde_i`.
//! 2. A braced subscript list (`X_{i, j}`) is joined: `X_ij`.
//! 3. A squared symbol (`\sigma_c^2`) gets a `_sq` suffix: `sigma_c_sq`.
//!    No other exponent is supported.
//!
//! `$` delimiters and backslashes are dropped throughout.

use log::trace;
use thiserror::Error;

/// Errors from [`derive_name`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    #[error("unable to derive a name from `{symbol}`: exponent `{exponent}` is not supported, only 2 is")]
    UnsupportedExponent { symbol: String, exponent: String },
}

/// Derives a plain node name from a display symbol.
///
/// # Errors
///
/// Returns [`NamingError::UnsupportedExponent`] if the symbol carries a
/// superscript other than `2`.
///
/// # Examples
///
/// ```
/// use pgm_builder_core::naming::derive_name;
///
/// assert_eq!(derive_name("$X$").unwrap(), "X");
/// assert_eq!(derive_name(r"$\sigma_c^2").unwrap(), "sigma_c_sq");
/// assert_eq!(derive_name(r"$\tilde{X}_{i,j}").unwrap(), "X_tilde_ij");
/// assert!(derive_name("$x^3$").is_err());
/// ```
pub fn derive_name(symbol: &str) -> Result<String, NamingError> {
    let decorated = symbol.starts_with("$\\");
    let mut name = symbol.trim_matches('$').replace('\\', "");

    if decorated && name.contains('{') {
        name = move_decoration(&name);
    }

    if name.contains("_{") {
        name = join_subscript(&name);
    }

    if let Some((base, exponent)) = name.split_once('^') {
        if exponent != "2" {
            return Err(NamingError::UnsupportedExponent {
                symbol: symbol.to_string(),
                exponent: exponent.to_string(),
            });
        }
        name = format!("{base}_sq");
    }

    trace!(symbol, name = name.as_str(); "Derived node name");
    Ok(name)
}

/// `tilde{X}_i` → `X_tilde_i`.
///
/// Without a subscript the decoration becomes the suffix: `hat{x}` → `x_hat`.
fn move_decoration(name: &str) -> String {
    let Some(open) = name.find('{') else {
        return name.to_string();
    };
    let modifier = &name[..open];
    let close = name[open..].find('}').map_or(name.len(), |idx| open + idx);
    let inner = &name[open + 1..close];
    let rest = name.get(close + 1..).unwrap_or_default();

    let undecorated = format!("{inner}{rest}");
    match undecorated.split_once('_') {
        Some((base, extras)) => format!("{base}_{modifier}_{extras}"),
        None => format!("{undecorated}_{modifier}"),
    }
}

/// `X_{i, j}` → `X_ij`.
fn join_subscript(name: &str) -> String {
    let Some((prefix, rest)) = name.split_once("_{") else {
        return name.to_string();
    };
    let (subscript, rest) = rest.split_once('}').unwrap_or((rest, ""));
    let indices: String = subscript
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    format!("{prefix}_{indices}{rest}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_derives(symbol: &str, expected: &str) {
        assert_eq!(
            derive_name(symbol).as_deref(),
            Ok(expected),
            "deriving name from {symbol:?}"
        );
    }

    #[test]
    fn test_plain_symbols() {
        assert_derives("test", "test");
        assert_derives("$X$", "X");
        assert_derives(r"$\theta$", "theta");
        assert_derives(r"$\Sigma$", "Sigma");
        assert_derives(r"$\sigma_c", "sigma_c");
    }

    #[test]
    fn test_squared_symbol() {
        assert_derives(r"$\sigma_c^2", "sigma_c_sq");
        assert_derives("$x^2$", "x_sq");
    }

    #[test]
    fn test_brace_subscript() {
        assert_derives("$X_{i, j}", "X_ij");
        assert_derives("$X_{i,j,k}$", "X_ijk");
    }

    #[test]
    fn test_decorated_symbols() {
        assert_derives(r"$\tilde{X}_i", "X_tilde_i");
        assert_derives(r"$\tilde{X}_{i,j}", "X_tilde_ij");
        assert_derives(r"$\tilde{X}_{i,j}^2", "X_tilde_ij_sq");
    }

    #[test]
    fn test_decoration_without_subscript() {
        assert_derives(r"$\hat{x}$", "x_hat");
    }

    #[test]
    fn test_decoration_needs_leading_marker() {
        // Braces only count as a decoration right after `$\`.
        assert_derives("${x}_i$", "{x}_i");
    }

    #[test]
    fn test_unsupported_exponent() {
        let err = derive_name("$x^3$").unwrap_err();
        assert_eq!(
            err,
            NamingError::UnsupportedExponent {
                symbol: "$x^3$".to_string(),
                exponent: "3".to_string(),
            }
        );
        assert!(err.to_string().contains("only 2 is"));
    }

    #[test]
    fn test_unclosed_subscript() {
        assert_derives("$X_{i, j", "X_ij");
    }
}
