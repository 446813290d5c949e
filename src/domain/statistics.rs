use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::age::{calculate_age_on, AgeGroup};
use super::member::{Gender, Member};

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct GenderCount {
    pub male: usize,
    pub female: usize,
}

impl GenderCount {
    fn add(&mut self, gender: Gender) {
        match gender {
            Gender::Male => self.male += 1,
            Gender::Female => self.female += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.male + self.female
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct AgeGroupCount {
    pub male: usize,
    pub female: usize,
    pub total: usize,
}

/// Aggregated view over the whole member list.
///
/// `age_groups` always holds all four buckets; `spaces` and `activities`
/// only hold keys that occur in the input.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_members: usize,
    pub male_members: usize,
    pub female_members: usize,
    pub age_groups: BTreeMap<AgeGroup, AgeGroupCount>,
    pub spaces: BTreeMap<String, usize>,
    pub activities: BTreeMap<String, BTreeMap<AgeGroup, GenderCount>>,
}

impl Statistics {
    pub fn from_members(members: &[Member], today: NaiveDate) -> Self {
        let mut age_groups: BTreeMap<AgeGroup, AgeGroupCount> = AgeGroup::ALL
            .into_iter()
            .map(|group| (group, AgeGroupCount::default()))
            .collect();
        let mut spaces: BTreeMap<String, usize> = BTreeMap::new();
        let mut activities: BTreeMap<String, BTreeMap<AgeGroup, GenderCount>> = BTreeMap::new();
        let mut genders = GenderCount::default();

        for member in members {
            let group = AgeGroup::from_age(calculate_age_on(member.birth_date, today));
            genders.add(member.gender);

            let bucket = age_groups.entry(group).or_default();
            bucket.total += 1;
            match member.gender {
                Gender::Male => bucket.male += 1,
                Gender::Female => bucket.female += 1,
            }

            *spaces.entry(member.selected_space.clone()).or_insert(0) += 1;

            activities
                .entry(member.selected_activity.clone())
                .or_default()
                .entry(group)
                .or_default()
                .add(member.gender);
        }

        Self {
            total_members: members.len(),
            male_members: genders.male,
            female_members: genders.female,
            age_groups,
            spaces,
            activities,
        }
    }

    /// Share of all members in percent; 0 when there are no members.
    pub fn percentage(&self, count: usize) -> f64 {
        if self.total_members == 0 {
            return 0.0;
        }
        count as f64 * 100.0 / self.total_members as f64
    }
}

/// Tabular form of the statistics, one section per exported sheet.
#[derive(Debug, Clone, Serialize)]
pub struct StatisticsReport {
    pub overall: OverallRow,
    pub age_groups: Vec<AgeGroupRow>,
    pub activities: Vec<ActivityRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverallRow {
    pub total: usize,
    pub male: usize,
    pub female: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgeGroupRow {
    pub age_group: AgeGroup,
    pub label: &'static str,
    pub male: usize,
    pub female: usize,
    pub total: usize,
    pub percentage: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityRow {
    pub activity: String,
    pub total: usize,
    /// Every bucket is listed, including empty ones.
    pub breakdown: BTreeMap<AgeGroup, GenderCount>,
}

impl From<&Statistics> for StatisticsReport {
    fn from(stats: &Statistics) -> Self {
        let age_groups = stats
            .age_groups
            .iter()
            .map(|(group, count)| AgeGroupRow {
                age_group: *group,
                label: group.arabic_label(),
                male: count.male,
                female: count.female,
                total: count.total,
                percentage: format!("{:.1}%", stats.percentage(count.total)),
            })
            .collect();

        let activities = stats
            .activities
            .iter()
            .map(|(activity, groups)| {
                let breakdown: BTreeMap<AgeGroup, GenderCount> = AgeGroup::ALL
                    .into_iter()
                    .map(|group| (group, groups.get(&group).copied().unwrap_or_default()))
                    .collect();
                ActivityRow {
                    activity: activity.clone(),
                    total: groups.values().map(GenderCount::total).sum(),
                    breakdown,
                }
            })
            .collect();

        StatisticsReport {
            overall: OverallRow {
                total: stats.total_members,
                male: stats.male_members,
                female: stats.female_members,
            },
            age_groups,
            activities,
        }
    }
}
