//! Per-role qualitative templates.

use crate::models::{Archetype, BurstRisk, Role};

/// Strings and matchups rendered for one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleProfile {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    pub best_against: Vec<Archetype>,
    pub weak_against: Vec<Archetype>,
}

/// Values interpolated into the templates.
#[derive(Debug, Clone, Copy)]
pub struct ProfileInputs {
    pub total_attack: u32,
    pub total_defense: u32,
    pub total_stamina: u32,
    pub overall_score: u32,
    pub contact_points: u32,
    pub burst_risk: BurstRisk,
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn role_profile(role: Role, inputs: &ProfileInputs) -> RoleProfile {
    match role {
        Role::Attack => RoleProfile {
            strengths: vec![
                format!("High attack potential ({})", inputs.total_attack),
                "Good for Over Finish".to_string(),
                "Excellent against Stamina combos".to_string(),
                format!("Ratchet with {} contact points", inputs.contact_points),
            ],
            weaknesses: vec![
                format!("Burst resistance: {}", inputs.burst_risk),
                format!("Total defense: {}", inputs.total_defense),
                "Vulnerable to well-positioned defensive combos".to_string(),
            ],
            recommendations: lines(&[
                "Launch at maximum power to maximize attack",
                "Look for direct hits early in the battle",
                "Use Xtreme Dash to gain the advantage",
            ]),
            best_against: vec![Archetype::Stamina, Archetype::Balanced],
            weak_against: vec![Archetype::Defense],
        },
        Role::Defense => RoleProfile {
            strengths: vec![
                format!("High resistance ({})", inputs.total_defense),
                format!("Burst resistance: {}", inputs.burst_risk),
                "Excellent at holding the center".to_string(),
                "Good against direct attacks".to_string(),
            ],
            weaknesses: vec![
                format!("Total attack: {}", inputs.total_attack),
                "Hard to land an Over Finish".to_string(),
                "Can lose by Spin Finish against Stamina".to_string(),
            ],
            recommendations: lines(&[
                "Launch at a defensive angle to absorb hits",
                "Stay in the center of the stadium",
                "Wait for the opponent to spend its energy",
            ]),
            best_against: vec![Archetype::Attack],
            weak_against: vec![Archetype::Stamina],
        },
        Role::Stamina => RoleProfile {
            strengths: vec![
                format!("Excellent stamina ({})", inputs.total_stamina),
                "Spin Finish potential".to_string(),
                "Can win by attrition".to_string(),
                format!("Burst resistance: {}", inputs.burst_risk),
            ],
            weaknesses: vec![
                format!("Total attack: {}", inputs.total_attack),
                format!("Total defense: {}", inputs.total_defense),
                "Vulnerable to well-placed direct attacks".to_string(),
            ],
            recommendations: lines(&[
                "Launch with a consistent technique to keep the spin",
                "Avoid direct hits through positioning",
                "Use circular movement to wear the opponent down",
            ]),
            best_against: vec![Archetype::Attack],
            weak_against: vec![Archetype::Defense],
        },
        Role::Balance => RoleProfile {
            strengths: vec![
                format!("Balanced score ({})", inputs.overall_score),
                "Versatile against multiple types".to_string(),
                "Performs well in unknown matchups".to_string(),
            ],
            weaknesses: lines(&[
                "Does not stand out in any specific area",
                "Can be outclassed by specialized combos",
            ]),
            recommendations: lines(&[
                "Adapt the launch technique to the opponent",
                "Stay flexible in strategy during the battle",
                "Watch the opponent before committing",
            ]),
            best_against: Vec::new(),
            weak_against: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> ProfileInputs {
        ProfileInputs {
            total_attack: 105,
            total_defense: 20,
            total_stamina: 20,
            overall_score: 48,
            contact_points: 4,
            burst_risk: BurstRisk::High,
        }
    }

    #[test]
    fn test_attack_profile_interpolates_totals() {
        let profile = role_profile(Role::Attack, &inputs());
        assert_eq!(profile.strengths[0], "High attack potential (105)");
        assert_eq!(profile.strengths[3], "Ratchet with 4 contact points");
        assert_eq!(profile.weaknesses[0], "Burst resistance: High");
        assert_eq!(profile.weaknesses[1], "Total defense: 20");
        assert_eq!(profile.best_against, vec![Archetype::Stamina, Archetype::Balanced]);
        assert_eq!(profile.weak_against, vec![Archetype::Defense]);
    }

    #[test]
    fn test_matchup_table() {
        let i = inputs();
        assert_eq!(role_profile(Role::Defense, &i).best_against, vec![Archetype::Attack]);
        assert_eq!(role_profile(Role::Defense, &i).weak_against, vec![Archetype::Stamina]);
        assert_eq!(role_profile(Role::Stamina, &i).best_against, vec![Archetype::Attack]);
        assert_eq!(role_profile(Role::Stamina, &i).weak_against, vec![Archetype::Defense]);
    }

    #[test]
    fn test_balance_has_no_fixed_matchup() {
        let profile = role_profile(Role::Balance, &inputs());
        assert!(profile.best_against.is_empty());
        assert!(profile.weak_against.is_empty());
        assert_eq!(profile.strengths[0], "Balanced score (48)");
    }
}
