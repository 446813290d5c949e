use serde::Serialize;

/// An activity offered by the center. Club and space are fixed by the
/// activity; members only ever choose the activity.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Activity {
    pub name: &'static str,
    pub club: &'static str,
    pub space: &'static str,
    pub requires_medical_certificate: bool,
}

const SPORTS_SPACE: &str = "الفضاء الرياضي";
const CULTURAL_SPACE: &str = "الفضاء الثقافي";
const SCIENCE_SPACE: &str = "الفضاء العلمي";
const LANGUAGES_SPACE: &str = "فضاء اللغات";

const fn activity(name: &'static str, club: &'static str, space: &'static str) -> Activity {
    Activity { name, club, space, requires_medical_certificate: false }
}

const fn combat(name: &'static str) -> Activity {
    Activity {
        name,
        club: "نادي الرياضات القتالية",
        space: SPORTS_SPACE,
        requires_medical_certificate: true,
    }
}

static ACTIVITIES: &[Activity] = &[
    combat("الكراتي دو"),
    combat("الجيدو"),
    combat("الكينغ فو"),
    activity("كمال الأجسام", "نادي اللياقة البدنية", SPORTS_SPACE),
    activity("الأيروبيك", "نادي اللياقة البدنية", SPORTS_SPACE),
    activity("الشطرنج", "نادي الألعاب الفكرية", SPORTS_SPACE),
    activity("الرسم", "نادي الفنون التشكيلية", CULTURAL_SPACE),
    activity("الموسيقى", "نادي الموسيقى", CULTURAL_SPACE),
    activity("المسرح", "نادي المسرح", CULTURAL_SPACE),
    activity("الخط العربي", "نادي الأدب والمطالعة", CULTURAL_SPACE),
    activity("المطالعة", "نادي الأدب والمطالعة", CULTURAL_SPACE),
    activity("الإعلام الآلي", "نادي الإعلام الآلي", SCIENCE_SPACE),
    activity("الروبوتيك", "نادي الإعلام الآلي", SCIENCE_SPACE),
    activity("علم الفلك", "نادي علم الفلك", SCIENCE_SPACE),
    activity("اللغة الإنجليزية", "نادي اللغات الأجنبية", LANGUAGES_SPACE),
    activity("اللغة الفرنسية", "نادي اللغات الأجنبية", LANGUAGES_SPACE),
];

pub fn all_activities() -> &'static [Activity] {
    ACTIVITIES
}

pub fn find_activity(name: &str) -> Option<&'static Activity> {
    let name = name.trim();
    ACTIVITIES.iter().find(|a| a.name == name)
}

/// Whether registering for `activity` requires a medical certificate.
pub fn requires_medical_certificate(activity: &str) -> bool {
    find_activity(activity)
        .map(|a| a.requires_medical_certificate)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combat_activities_need_medical_certificate() {
        let combat: Vec<_> = all_activities()
            .iter()
            .filter(|a| a.requires_medical_certificate)
            .map(|a| a.name)
            .collect();
        assert_eq!(combat, vec!["الكراتي دو", "الجيدو", "الكينغ فو"]);
        assert!(requires_medical_certificate("الجيدو"));
        assert!(!requires_medical_certificate("الرسم"));
        assert!(!requires_medical_certificate("unknown"));
    }

    #[test]
    fn lookup_derives_club_and_space() {
        let karate = find_activity(" الكراتي دو ").unwrap();
        assert_eq!(karate.club, "نادي الرياضات القتالية");
        assert_eq!(karate.space, "الفضاء الرياضي");
        assert!(find_activity("السباحة").is_none());
    }

    #[test]
    fn activity_names_are_unique() {
        let mut names: Vec<_> = all_activities().iter().map(|a| a.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), all_activities().len());
    }
}
