//! Keyword classification of service records.

use service_gap_fusion_models::ServiceCategory;

/// Keywords per category, in precedence order. The first category with a
/// keyword found in the name or description wins.
const KEYWORDS: &[(ServiceCategory, &[&str])] = &[
    (
        ServiceCategory::ShelterHousing,
        &["shelter", "housing", "emergency", "transitional"],
    ),
    (
        ServiceCategory::FoodServices,
        &["food", "meal", "nutrition", "pantry", "kitchen"],
    ),
    (
        ServiceCategory::MedicalHealth,
        &["medical", "health", "clinic", "dental", "pharmacy"],
    ),
    (
        ServiceCategory::MentalHealth,
        &["mental", "counseling", "therapy", "psychiatric", "behavioral"],
    ),
    (
        ServiceCategory::Employment,
        &["job", "employment", "training", "career", "work"],
    ),
    (
        ServiceCategory::BasicNeeds,
        &["clothing", "hygiene", "shower", "laundry", "personal"],
    ),
    (
        ServiceCategory::LegalAdvocacy,
        &["legal", "advocacy", "case management"],
    ),
    (
        ServiceCategory::YouthFamily,
        &["youth", "children", "family"],
    ),
];

/// Classifies a service from its name and description.
#[must_use]
pub fn categorize(name: Option<&str>, description: Option<&str>) -> ServiceCategory {
    let name = name.unwrap_or_default().to_lowercase();
    let description = description.unwrap_or_default().to_lowercase();

    KEYWORDS
        .iter()
        .find(|(_, words)| {
            words
                .iter()
                .any(|word| name.contains(word) || description.contains(word))
        })
        .map_or(ServiceCategory::Other, |(category, _)| *category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_name_or_description() {
        assert_eq!(
            categorize(Some("Father Joe's Villages Shelter"), None),
            ServiceCategory::ShelterHousing
        );
        assert_eq!(
            categorize(Some("St. Vincent"), Some("Hot MEALS daily")),
            ServiceCategory::FoodServices
        );
    }

    #[test]
    fn earlier_category_wins() {
        // "health" and "mental" both match; Medical/Health comes first.
        assert_eq!(
            categorize(Some("Community Mental Health Center"), None),
            ServiceCategory::MedicalHealth
        );
        assert_eq!(
            categorize(Some("Youth Emergency Shelter"), None),
            ServiceCategory::ShelterHousing
        );
    }

    #[test]
    fn unmatched_is_other() {
        assert_eq!(categorize(Some("Library"), None), ServiceCategory::Other);
        assert_eq!(categorize(None, None), ServiceCategory::Other);
    }
}
