//! Privilege model: what a single level may do system-wide.
//!
//! Every permission decision in the workspace goes through these functions.
//! They are pure and total over [`Level`]; raw integers must be validated
//! with [`Level::new`] first.

use std::collections::BTreeSet;

use serde::Serialize;

use super::Level;

/// Creating posts requires a verified account.
pub fn can_create_post(level: Level) -> bool {
    level.value() >= 1
}

/// Bookmarking and sharing are open to every authenticated user.
pub fn can_bookmark_or_share(_level: Level) -> bool {
    true
}

/// Only the dedicated verifier tier may verify others. Exact match: higher
/// admin tiers do not inherit this.
pub fn can_verify_others(level: Level) -> bool {
    level == Level::VERIFIER
}

pub fn can_manage_user_levels(level: Level) -> bool {
    level.value() >= 6
}

/// The user directory is shown to the same tiers that can edit levels.
pub fn can_view_user_directory(level: Level) -> bool {
    can_manage_user_levels(level)
}

/// The user-management area hosts the verifier tool (level 5) and level
/// editing (6 and above).
pub fn can_access_user_management(level: Level) -> bool {
    can_verify_others(level) || can_manage_user_levels(level)
}

/// Levels an administrator may hand out.
///
/// This is a fixed table, not a threshold: level 8 only manages the senior
/// band 5..=7, level 9 is unrestricted.
pub fn levels_assignable_by(admin_level: Level) -> BTreeSet<Level> {
    let range = match admin_level.value() {
        6 => 0..=5,
        7 => 0..=6,
        8 => 5..=7,
        9 => 0..=9,
        _ => return BTreeSet::new(),
    };

    Level::all()
        .filter(|level| range.contains(&level.value()))
        .collect()
}

/// Raw level values for a level picker, ascending.
pub fn level_options(admin_level: Level) -> Vec<i16> {
    levels_assignable_by(admin_level)
        .into_iter()
        .map(i16::from)
        .collect()
}

pub fn can_assign_level(admin_level: Level, target_level: Level) -> bool {
    levels_assignable_by(admin_level).contains(&target_level)
}

pub fn can_report(level: Level, is_author: bool) -> bool {
    level.value() >= 1 && !is_author
}

pub fn has_admin_delete_rights(level: Level) -> bool {
    level.value() >= 7
}

/// The full capability set of one level, for callers that render it whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub level: Level,
    pub create_post: bool,
    pub bookmark_or_share: bool,
    pub verify_others: bool,
    pub manage_user_levels: bool,
    pub access_user_management: bool,
    pub admin_delete: bool,
    pub assignable_levels: BTreeSet<Level>,
}

impl Capabilities {
    pub fn for_level(level: Level) -> Self {
        Self {
            level,
            create_post: can_create_post(level),
            bookmark_or_share: can_bookmark_or_share(level),
            verify_others: can_verify_others(level),
            manage_user_levels: can_manage_user_levels(level),
            access_user_management: can_access_user_management(level),
            admin_delete: has_admin_delete_rights(level),
            assignable_levels: levels_assignable_by(level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lvl(raw: i16) -> Level {
        Level::new(raw).unwrap()
    }

    fn set(raw: &[i16]) -> BTreeSet<Level> {
        raw.iter().map(|r| lvl(*r)).collect()
    }

    #[test]
    fn test_assignable_table_for_every_level() {
        let expected: [(i16, BTreeSet<Level>); 10] = [
            (0, set(&[])),
            (1, set(&[])),
            (2, set(&[])),
            (3, set(&[])),
            (4, set(&[])),
            (5, set(&[])),
            (6, set(&[0, 1, 2, 3, 4, 5])),
            (7, set(&[0, 1, 2, 3, 4, 5, 6])),
            (8, set(&[5, 6, 7])),
            (9, set(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9])),
        ];

        for (admin, levels) in expected {
            assert_eq!(levels_assignable_by(lvl(admin)), levels, "admin level {admin}");
        }
    }

    #[test]
    fn test_level_eight_cannot_touch_junior_levels() {
        assert!(!can_assign_level(lvl(8), lvl(3)));
        assert!(!can_assign_level(lvl(8), lvl(8)));
        assert!(can_assign_level(lvl(8), lvl(6)));
    }

    #[test]
    fn test_level_options_are_sorted_raw_values() {
        assert_eq!(level_options(lvl(8)), vec![5, 6, 7]);
        assert_eq!(level_options(lvl(9)), (0..=9).collect::<Vec<i16>>());
        assert!(level_options(lvl(5)).is_empty());
    }

    #[test]
    fn test_verifier_is_exact_match() {
        for level in Level::all() {
            assert_eq!(can_verify_others(level), level.value() == 5);
        }
    }

    #[test]
    fn test_thresholds() {
        assert!(!can_create_post(lvl(0)));
        assert!(can_create_post(lvl(1)));
        assert!(can_bookmark_or_share(lvl(0)));
        assert!(!can_manage_user_levels(lvl(5)));
        assert!(can_manage_user_levels(lvl(6)));
        assert!(!has_admin_delete_rights(lvl(6)));
        assert!(has_admin_delete_rights(lvl(7)));
    }

    #[test]
    fn test_report_requires_level_and_non_author() {
        assert!(!can_report(lvl(0), false));
        assert!(can_report(lvl(1), false));
        assert!(!can_report(lvl(9), true));
    }

    #[test]
    fn test_user_management_access() {
        let allowed: Vec<u8> = Level::all()
            .filter(|l| can_access_user_management(*l))
            .map(Level::value)
            .collect();
        assert_eq!(allowed, vec![5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_capabilities_bundle() {
        let caps = Capabilities::for_level(lvl(5));
        assert!(caps.create_post);
        assert!(caps.verify_others);
        assert!(!caps.manage_user_levels);
        assert!(caps.assignable_levels.is_empty());
    }
}
