//! Dose-form resolution against the controlled mapping table.

use std::collections::BTreeMap;

use ccdd_model::DoseFormMapRecord;

/// Resolver for (pharmaceutical form, route of administration) pairs.
///
/// Route-specific entries win; entries without a route act as a fallback
/// keyed by form alone. Unmatched pairs resolve to `None` and the product is
/// excluded from dose-form-dependent grouping.
#[derive(Debug, Default)]
pub struct DoseFormMap {
    by_form_route: BTreeMap<(String, String), String>,
    by_form: BTreeMap<String, String>,
}

impl DoseFormMap {
    pub fn from_records(records: &[DoseFormMapRecord]) -> Self {
        let mut map = Self::default();
        for record in records {
            let form = record.pharm_form.trim().to_uppercase();
            let route = record.route_admin.trim().to_uppercase();
            let dose_form = record.ntp_dose_form.trim().to_string();
            if form.is_empty() || dose_form.is_empty() {
                continue;
            }
            if route.is_empty() {
                map.by_form.entry(form).or_insert(dose_form);
            } else {
                map.by_form_route.entry((form, route)).or_insert(dose_form);
            }
        }
        map
    }

    pub fn resolve(&self, pharm_form: &str, route_admin: &str) -> Option<&str> {
        let form = pharm_form.trim().to_uppercase();
        let route = route_admin.trim().to_uppercase();
        if let Some(dose_form) = self.by_form_route.get(&(form.clone(), route)) {
            return Some(dose_form);
        }
        self.by_form.get(&form).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_form_route.len() + self.by_form.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
