use atomic_core::RiskLevel;

/// Number of changed importers at which a file becomes medium risk.
pub const FAN_IN_THRESHOLD: usize = 3;

#[must_use]
pub fn classify_risk(api_surface_changes: bool, fan_in: usize) -> RiskLevel {
    if api_surface_changes {
        RiskLevel::High
    } else if fan_in >= FAN_IN_THRESHOLD {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_changes_are_high_risk() {
        assert_eq!(classify_risk(true, 0), RiskLevel::High);
        assert_eq!(classify_risk(true, 10), RiskLevel::High);
    }

    #[test]
    fn fan_in_threshold_is_medium() {
        assert_eq!(classify_risk(false, 2), RiskLevel::Low);
        assert_eq!(classify_risk(false, 3), RiskLevel::Medium);
    }
}
