//! Daily AI-estimate credits. Each tier gets a credit budget per UTC day and
//! each model has a credit cost per estimate.

use crate::license::Tier;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const PRO_MODEL: &str = "gemini-2.5-pro";

const FREE_DAILY_CREDITS: i32 = 2;
const PREMIUM_DAILY_CREDITS: i32 = 20;
const PREMIUM_AI_DAILY_CREDITS: i32 = 100;
const PRO_COST: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub daily_credits: i32,
    pub cost: i32,
}

pub fn quota_for(tier: Tier, model: &str) -> Quota {
    let pro = model == PRO_MODEL;
    match tier {
        Tier::Free => Quota {
            daily_credits: FREE_DAILY_CREDITS,
            cost: 1,
        },
        Tier::Premium => Quota {
            daily_credits: PREMIUM_DAILY_CREDITS,
            cost: if pro { PRO_COST } else { 1 },
        },
        Tier::PremiumAi => Quota {
            daily_credits: PREMIUM_AI_DAILY_CREDITS,
            cost: if pro { PRO_COST } else { 1 },
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    /// Estimates still affordable before this one is charged.
    pub remaining: i32,
    /// Credits used today after this check.
    pub used: i32,
}

/// Decides whether another estimate fits into today's budget. Usage recorded
/// on any other date counts as zero.
pub fn check(quota: Quota, stored_count: i32, stored_date: Option<&str>, today: &str) -> Decision {
    let used = if stored_date == Some(today) {
        stored_count.max(0)
    } else {
        0
    };
    let allowed = used + quota.cost <= quota.daily_credits;
    let remaining = (quota.daily_credits - used).max(0) / quota.cost;
    Decision {
        allowed,
        remaining,
        used: if allowed { used + quota.cost } else { used },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TODAY: &str = "2024-07-10";

    #[test]
    fn quotas_per_tier_and_model() {
        assert_eq!(quota_for(Tier::Free, PRO_MODEL), Quota { daily_credits: 2, cost: 1 });
        assert_eq!(quota_for(Tier::Free, DEFAULT_MODEL), Quota { daily_credits: 2, cost: 1 });
        assert_eq!(quota_for(Tier::Premium, DEFAULT_MODEL), Quota { daily_credits: 20, cost: 1 });
        assert_eq!(quota_for(Tier::Premium, PRO_MODEL), Quota { daily_credits: 20, cost: 10 });
        assert_eq!(quota_for(Tier::PremiumAi, PRO_MODEL), Quota { daily_credits: 100, cost: 10 });
        assert_eq!(quota_for(Tier::PremiumAi, "other"), Quota { daily_credits: 100, cost: 1 });
    }

    #[test]
    fn free_tier_gets_two_per_day() {
        let q = quota_for(Tier::Free, DEFAULT_MODEL);
        let first = check(q, 0, None, TODAY);
        assert_eq!(first, Decision { allowed: true, remaining: 2, used: 1 });
        let second = check(q, first.used, Some(TODAY), TODAY);
        assert_eq!(second, Decision { allowed: true, remaining: 1, used: 2 });
        let third = check(q, second.used, Some(TODAY), TODAY);
        assert_eq!(third, Decision { allowed: false, remaining: 0, used: 2 });
    }

    #[test]
    fn usage_resets_on_new_day() {
        let q = quota_for(Tier::Free, DEFAULT_MODEL);
        let d = check(q, 2, Some("2024-07-09"), TODAY);
        assert!(d.allowed);
        assert_eq!(d.used, 1);
    }

    #[test]
    fn pro_model_costs_ten_credits() {
        let q = quota_for(Tier::Premium, PRO_MODEL);
        let d = check(q, 5, Some(TODAY), TODAY);
        assert_eq!(d, Decision { allowed: true, remaining: 1, used: 15 });
        let d = check(q, 15, Some(TODAY), TODAY);
        assert_eq!(d, Decision { allowed: false, remaining: 0, used: 15 });
    }

    #[test]
    fn overspent_count_never_goes_negative() {
        let q = quota_for(Tier::Free, DEFAULT_MODEL);
        let d = check(q, 7, Some(TODAY), TODAY);
        assert!(!d.allowed);
        assert_eq!(d.remaining, 0);
    }
}
