//! The pricing table.

use serde::Serialize;

use lanhub_core::{AppError, AppResult};

/// Currency every price is expressed in.
pub const CURRENCY: &str = "PEN";

/// A fixed reservation plan, identified by its price label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// Price label, e.g. `S/2`.
    pub id: &'static str,
    /// Session length in minutes.
    pub duration_minutes: i64,
    /// Points earned per booth.
    pub base_points: i64,
    /// Complimentary item.
    pub bonus: &'static str,
}

/// All plans offered, cheapest first.
pub const PLANS: [Plan; 3] = [
    Plan {
        id: "S/1",
        duration_minutes: 30,
        base_points: 1,
        bonus: "1 small snack",
    },
    Plan {
        id: "S/2",
        duration_minutes: 60,
        base_points: 2,
        bonus: "1 glass of Pepsi (250ml)",
    },
    Plan {
        id: "S/5",
        duration_minutes: 180,
        base_points: 6,
        bonus: "1 Pepsi (500ml)",
    },
];

/// Look up a plan by its label.
pub fn plan_for(plan_id: &str) -> AppResult<&'static Plan> {
    PLANS.iter().find(|p| p.id == plan_id).ok_or_else(|| {
        let available: Vec<&str> = PLANS.iter().map(|p| p.id).collect();
        AppError::invalid_plan(plan_id, &available)
    })
}

impl Plan {
    /// Price of one booth, the numeric part of the label.
    pub fn unit_price(&self) -> i64 {
        self.id
            .trim_start_matches("S/")
            .parse()
            .unwrap_or_default()
    }

    /// Price for `booths` booths.
    pub fn total_price(&self, booths: i64) -> i64 {
        self.unit_price() * booths
    }

    /// Points earned for `booths` booths.
    pub fn points_for(&self, booths: i64) -> i64 {
        self.base_points * booths
    }

    /// Display text for the session length.
    pub fn duration_text(&self) -> String {
        duration_text(self.duration_minutes)
    }
}

/// Render a duration as `"30 min"`, `"1 hora"`, `"1.5 horas"` or `"3 horas"`.
pub fn duration_text(minutes: i64) -> String {
    if minutes < 60 {
        return format!("{minutes} min");
    }
    let hours = minutes as f64 / 60.0;
    let unit = if minutes == 60 { "hora" } else { "horas" };
    if minutes % 60 == 0 {
        format!("{} {unit}", minutes / 60)
    } else {
        let rounded = (hours * 100.0).round() / 100.0;
        format!("{rounded} {unit}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lanhub_core::ErrorKind;

    #[test]
    fn test_plan_lookup() {
        let plan = plan_for("S/5").expect("plan exists");
        assert_eq!(plan.duration_minutes, 180);
        assert_eq!(plan.unit_price(), 5);
        assert_eq!(plan.total_price(2), 10);
        assert_eq!(plan.points_for(2), 12);
    }

    #[test]
    fn test_unknown_plan_lists_available() {
        let err = plan_for("S/10").expect_err("unknown plan");
        assert_eq!(err.kind, ErrorKind::InvalidPlan);
        let details = err.details.expect("details");
        assert_eq!(
            details["available_plans"],
            serde_json::json!(["S/1", "S/2", "S/5"])
        );
    }

    #[test]
    fn test_duration_text() {
        assert_eq!(duration_text(30), "30 min");
        assert_eq!(duration_text(60), "1 hora");
        assert_eq!(duration_text(90), "1.5 horas");
        assert_eq!(duration_text(180), "3 horas");
        assert_eq!(duration_text(240), "4 horas");
    }
}
