//! Age distribution of active members

use chrono::NaiveDate;
use gymstats_common::{MemberProfile, RecordKind, Result, StatsError};
use serde::{Deserialize, Serialize};

/// Active members per age group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AgeGroups {
    /// Younger than 18
    pub under_18: usize,
    /// 18 to 25 inclusive
    #[serde(rename = "18_to_25")]
    pub from_18_to_25: usize,
    /// 26 to 35 inclusive
    #[serde(rename = "26_to_35")]
    pub from_26_to_35: usize,
    /// Older than 35
    pub over_35: usize,
}

impl AgeGroups {
    /// Members counted in any group
    pub const fn total(&self) -> usize {
        self.under_18 + self.from_18_to_25 + self.from_26_to_35 + self.over_35
    }

    fn record(&mut self, age: u32) {
        match age {
            0..=17 => self.under_18 += 1,
            18..=25 => self.from_18_to_25 += 1,
            26..=35 => self.from_26_to_35 += 1,
            _ => self.over_35 += 1,
        }
    }
}

/// Age in whole years on `on`, `None` if `birth_date` is later than `on`
pub fn age_on(birth_date: NaiveDate, on: NaiveDate) -> Option<u32> {
    on.years_since(birth_date)
}

/// Groups the members by age on `reference_date`.
///
/// Members without a birth date are left out.
pub fn age_groups(
    active_members: &[&MemberProfile],
    reference_date: NaiveDate,
) -> Result<AgeGroups> {
    let mut groups = AgeGroups::default();
    for profile in active_members {
        let Some(birth_date) = profile.birth_date else {
            continue;
        };
        let age = age_on(birth_date, reference_date).ok_or_else(|| {
            StatsError::invalid_input(
                RecordKind::MemberProfile,
                "birth_date",
                profile.member_id,
                format!("{birth_date} is after {reference_date}"),
            )
        })?;
        groups.record(age);
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use gymstats_common::test_utils::fixtures::member_born;
    use gymstats_common::test_utils::mock_date;
    use gymstats_common::MemberId;
    use proptest::prelude::*;

    fn age_by_birthday(birth_date: NaiveDate, on: NaiveDate) -> i32 {
        let mut age = on.year() - birth_date.year();
        if (on.month(), on.day()) < (birth_date.month(), birth_date.day()) {
            age -= 1;
        }
        age
    }

    #[test]
    fn test_exactly_eighteen() {
        let members = vec![member_born(1, mock_date(2006, 3, 15))];
        let refs: Vec<&MemberProfile> = members.iter().collect();
        let groups = age_groups(&refs, mock_date(2024, 3, 15)).unwrap();
        assert_eq!(groups.from_18_to_25, 1);
        assert_eq!(groups.total(), 1);
    }

    #[test]
    fn test_day_before_eighteenth_birthday() {
        assert_eq!(age_on(mock_date(2006, 3, 15), mock_date(2024, 3, 14)), Some(17));
    }

    #[test]
    fn test_group_boundaries() {
        let on = mock_date(2024, 6, 1);
        let members = vec![
            member_born(1, mock_date(2010, 1, 1)),  // 14
            member_born(2, mock_date(1998, 6, 1)),  // 26
            member_born(3, mock_date(1998, 6, 2)),  // 25
            member_born(4, mock_date(1988, 6, 1)),  // 36
            member_born(5, mock_date(1988, 6, 2)),  // 35
            MemberProfile::new(MemberId(6)),
        ];
        let refs: Vec<&MemberProfile> = members.iter().collect();
        let groups = age_groups(&refs, on).unwrap();
        assert_eq!(
            groups,
            AgeGroups {
                under_18: 1,
                from_18_to_25: 1,
                from_26_to_35: 2,
                over_35: 1,
            }
        );
    }

    #[test]
    fn test_birth_date_in_future_is_rejected() {
        let members = vec![member_born(8, mock_date(2030, 1, 1))];
        let refs: Vec<&MemberProfile> = members.iter().collect();
        let err = age_groups(&refs, mock_date(2024, 1, 1)).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_serialized_group_names() {
        let json = serde_json::to_value(AgeGroups::default()).unwrap();
        for key in ["under_18", "18_to_25", "26_to_35", "over_35"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }

    proptest! {
        #[test]
        fn age_matches_birthday_rule(
            birth in (1920i32..2024, 1u32..=12, 1u32..=28),
            offset_days in 0i64..40_000,
        ) {
            let birth_date = mock_date(birth.0, birth.1, birth.2);
            let on = birth_date + chrono::Duration::days(offset_days);
            let expected = age_by_birthday(birth_date, on);
            prop_assert_eq!(age_on(birth_date, on).map(|a| a as i32), Some(expected));
        }
    }
}
