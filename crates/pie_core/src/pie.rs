use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The player's in-progress pie, persisted between the kitchen assembly
/// phase and the hall delivery phase of a stage.
///
/// `delivered` is informational: it is set just before the pie is discarded
/// so the presentation layer can still animate the handed-over pie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarriedPie {
    pub cooked: bool,
    pub filling: Option<String>,
    pub lattice: bool,
    pub toppings: BTreeSet<String>,
    pub delivered: bool,
}

impl CarriedPie {
    /// Fresh-assembly state: uncooked, empty, not delivered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last applied filling wins; the kitchen lets the player swap jams
    /// freely before baking.
    pub fn apply_filling(&mut self, filling: impl Into<String>) {
        self.filling = Some(filling.into());
    }

    pub fn apply_lattice(&mut self) {
        self.lattice = true;
    }

    pub fn bake(&mut self) {
        self.cooked = true;
    }

    /// Returns false when the topping was already present.
    pub fn add_topping(&mut self, topping: impl Into<String>) -> bool {
        self.toppings.insert(topping.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_pie_is_uncooked_and_empty() {
        let pie = CarriedPie::new();
        assert!(!pie.cooked);
        assert!(pie.filling.is_none());
        assert!(!pie.lattice);
        assert!(pie.toppings.is_empty());
        assert!(!pie.delivered);
    }

    #[test]
    fn later_filling_replaces_earlier_filling() {
        let mut pie = CarriedPie::new();
        pie.apply_filling("pie_jam_apple");
        pie.apply_filling("pie_jam_peach");
        assert_eq!(pie.filling.as_deref(), Some("pie_jam_peach"));
    }

    #[test]
    fn duplicate_topping_is_reported_and_kept_unique() {
        let mut pie = CarriedPie::new();
        assert!(pie.add_topping("pie_ingredient_cherry"));
        assert!(!pie.add_topping("pie_ingredient_cherry"));
        assert_eq!(pie.toppings.len(), 1);
    }

    #[test]
    fn pie_deserializes_with_missing_fields_as_defaults() {
        let pie: CarriedPie = serde_json::from_str(r#"{"cooked":true}"#).expect("pie");
        assert!(pie.cooked);
        assert!(pie.filling.is_none());
        assert!(pie.toppings.is_empty());
    }
}
