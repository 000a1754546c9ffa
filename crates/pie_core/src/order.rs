use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::pie::CarriedPie;

/// A customer's acceptance criteria for a delivered pie.
///
/// Absent requirement fields are unconstrained. The `ignore_*` flags skip
/// their whole check, taking precedence over the paired requirement field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderRule {
    pub filling: Option<String>,
    pub needs_lattice: Option<bool>,
    pub ignore_lattice: bool,
    pub toppings: Option<BTreeSet<String>>,
    pub ignore_toppings: bool,
}

/// Decide whether a carried pie satisfies an order.
///
/// An absent or uncooked pie never satisfies any order. Otherwise the result
/// is the AND of the filling, lattice and topping checks, each passing when
/// its rule field is absent.
pub fn evaluate(pie: Option<&CarriedPie>, rule: &OrderRule) -> bool {
    let Some(pie) = pie else {
        return false;
    };
    if !pie.cooked {
        return false;
    }
    filling_matches(pie, rule) && lattice_matches(pie, rule) && toppings_match(pie, rule)
}

fn filling_matches(pie: &CarriedPie, rule: &OrderRule) -> bool {
    match &rule.filling {
        Some(required) => pie.filling.as_deref() == Some(required.as_str()),
        None => true,
    }
}

fn lattice_matches(pie: &CarriedPie, rule: &OrderRule) -> bool {
    if rule.ignore_lattice {
        return true;
    }
    match rule.needs_lattice {
        // Exact equality: a rule requiring no lattice fails a latticed pie.
        Some(required) => pie.lattice == required,
        None => true,
    }
}

fn toppings_match(pie: &CarriedPie, rule: &OrderRule) -> bool {
    if rule.ignore_toppings {
        return true;
    }
    match &rule.toppings {
        Some(required) => required
            .iter()
            .all(|topping| pie.toppings.contains(topping)),
        None => true,
    }
}
