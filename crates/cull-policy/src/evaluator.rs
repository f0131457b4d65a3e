//! The retention policy evaluator.
//!
//! [`decide`] combines a cookie, the exact-identity lists, the domain
//! expressions and the process settings into a keep/delete verdict. It is
//! pure and deterministic for identical inputs; the scheduler applies the
//! verdicts and records the reasons in the cleanup log.

use crate::matcher;
use cull_core::{Cookie, CookieId, Expression, ListSnapshot, ListType, Settings};
use std::fmt;

/// Outcome of evaluating one cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The cookie survives the sweep
    Keep(KeepReason),
    /// The cookie is deleted
    Delete(DeleteReason),
}

impl Verdict {
    /// True if the verdict is a deletion.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete(_))
    }
}

/// Why a cookie was kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeepReason {
    /// The cookie id is on the whitelist
    WhitelistEntry,
    /// A whitelist expression matched the domain
    WhitelistExpression(String),
    /// The cookie id is on the graylist and graylist cleanup is disabled
    GraylistEntry,
    /// A graylist expression matched and graylist cleanup is disabled
    GraylistExpression(String),
}

impl fmt::Display for KeepReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WhitelistEntry => write!(f, "whitelisted"),
            Self::WhitelistExpression(pattern) => {
                write!(f, "matched whitelist expression {pattern}")
            }
            Self::GraylistEntry => write!(f, "graylisted (graylist cleanup disabled)"),
            Self::GraylistExpression(pattern) => {
                write!(
                    f,
                    "matched graylist expression {pattern} (graylist cleanup disabled)"
                )
            }
        }
    }
}

/// Why a cookie was deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteReason {
    /// No list entry or expression protects the cookie
    NoProtection,
    /// The cookie was only graylist-protected and graylist cleanup is enabled
    GraylistCleanup,
}

impl fmt::Display for DeleteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoProtection => write!(f, "no list or expression protection"),
            Self::GraylistCleanup => write!(f, "graylist cleanup enabled"),
        }
    }
}

/// Classify a cookie against the lists, expressions and settings.
///
/// Evaluation order, first match wins:
/// 1. cookie id on the whitelist
/// 2. whitelist expression matching the domain
/// 3. graylist entry or expression, while graylist cleanup is disabled
/// 4. otherwise: delete
///
/// The whitelist always wins: a cookie sitting on both lists is kept.
#[must_use]
pub fn decide(
    cookie: &Cookie,
    lists: &ListSnapshot,
    expressions: &[Expression],
    settings: &Settings,
) -> Verdict {
    let id = CookieId::of(cookie);

    if lists.whitelist.contains(&id) {
        return Verdict::Keep(KeepReason::WhitelistEntry);
    }

    if let Some(exp) = matching_expression(expressions, ListType::Whitelist, &cookie.domain) {
        return Verdict::Keep(KeepReason::WhitelistExpression(exp.domain_pattern.clone()));
    }

    let graylist_expression =
        matching_expression(expressions, ListType::Graylist, &cookie.domain);
    let graylisted = lists.graylist.contains(&id);

    if !settings.enable_graylist_cleanup {
        if graylisted {
            return Verdict::Keep(KeepReason::GraylistEntry);
        }
        if let Some(exp) = graylist_expression {
            return Verdict::Keep(KeepReason::GraylistExpression(exp.domain_pattern.clone()));
        }
    }

    if graylisted || graylist_expression.is_some() {
        Verdict::Delete(DeleteReason::GraylistCleanup)
    } else {
        Verdict::Delete(DeleteReason::NoProtection)
    }
}

fn matching_expression<'a>(
    expressions: &'a [Expression],
    list_type: ListType,
    domain: &str,
) -> Option<&'a Expression> {
    expressions
        .iter()
        .filter(|exp| exp.list_type == list_type)
        .find(|exp| matcher::matches(&exp.domain_pattern, domain))
}
