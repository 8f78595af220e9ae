//! Kenyan food catalog
//!
//! Nutrition data per 100g serving and diabetes tips for common local foods.
//! The catalog is an immutable static table; lookups return references into
//! it and callers build their own localized output values.

use crate::models::{DiabetesType, GlucoseStatus, Locale, LocalizedList, LocalizedText};
use serde::{Deserialize, Serialize};

/// How strongly a food raises blood glucose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactTier {
    None,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl std::str::FromStr for ImpactTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "none" => Ok(ImpactTier::None),
            "low" => Ok(ImpactTier::Low),
            "medium" => Ok(ImpactTier::Medium),
            "high" => Ok(ImpactTier::High),
            "very_high" => Ok(ImpactTier::VeryHigh),
            other => Err(format!("Invalid impact tier: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodCategory {
    Staple,
    Vegetable,
    Bread,
    LegumeGrain,
    Protein,
    Snack,
    Tuber,
}

/// Static catalog entry
#[derive(Debug, Clone, Copy)]
pub struct FoodEntry {
    /// Lookup key (lowercase, underscores)
    pub key: &'static str,
    pub name: LocalizedText,
    pub category: FoodCategory,
    pub calories: u16,
    /// Grams per 100g
    pub carbs: f64,
    pub fiber: f64,
    pub protein: f64,
    pub fat: f64,
    pub glycemic_index: u8,
    pub impact: ImpactTier,
    pub tips: LocalizedList,
}

/// Localized catalog entry for listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodListing {
    pub key: String,
    pub name: String,
    pub category: FoodCategory,
    pub calories: u16,
    pub carbs: f64,
    pub fiber: f64,
    pub protein: f64,
    pub fat: f64,
    pub glycemic_index: u8,
    pub glucose_impact: ImpactTier,
    pub diabetes_tips: Vec<String>,
}

impl FoodEntry {
    pub fn localized(&self, locale: Locale) -> FoodListing {
        FoodListing {
            key: self.key.to_string(),
            name: self.name.get(locale).to_string(),
            category: self.category,
            calories: self.calories,
            carbs: self.carbs,
            fiber: self.fiber,
            protein: self.protein,
            fat: self.fat,
            glycemic_index: self.glycemic_index,
            glucose_impact: self.impact,
            diabetes_tips: self.tips.get(locale),
        }
    }
}

pub static FOOD_CATALOG: [FoodEntry; 8] = [
    FoodEntry {
        key: "ugali",
        name: LocalizedText::new("Ugali", "Ugali"),
        category: FoodCategory::Staple,
        calories: 112,
        carbs: 24.0,
        fiber: 1.2,
        protein: 2.4,
        fat: 0.4,
        glycemic_index: 85,
        impact: ImpactTier::High,
        tips: LocalizedList::new(
            &[
                "Eat smaller portions (1/2 cup instead of 1 cup)",
                "Pair with sukuma wiki or other vegetables",
                "Choose whole grain ugali when possible",
                "Monitor blood sugar 2 hours after eating",
            ],
            &[
                "Kula kipimo kidogo (kikombe 1/2 badala ya 1)",
                "Changanya na sukuma wiki au mboga zingine",
                "Chagua ugali wa nafaka nzima ikiwezekana",
                "Fuatilia sukari ya damu masaa 2 baada ya kula",
            ],
        ),
    },
    FoodEntry {
        key: "sukuma_wiki",
        name: LocalizedText::new("Sukuma Wiki (Collard Greens)", "Sukuma Wiki"),
        category: FoodCategory::Vegetable,
        calories: 32,
        carbs: 5.4,
        fiber: 4.0,
        protein: 3.0,
        fat: 0.6,
        glycemic_index: 15,
        impact: ImpactTier::Low,
        tips: LocalizedList::new(
            &[
                "Excellent choice for diabetes - eat freely",
                "Rich in fiber which helps control blood sugar",
                "Cook with minimal oil",
                "Great side dish to balance high-carb foods",
            ],
            &[
                "Chaguo bora kwa kisukari - kula bila wasiwasi",
                "Ina nyuzi nyingi zinazosaidia kudhibiti sukari ya damu",
                "Pika kwa mafuta machache",
                "Mboga nzuri ya kuongeza chakula chenye kabohaidreti nyingi",
            ],
        ),
    },
    FoodEntry {
        key: "chapati",
        name: LocalizedText::new("Chapati", "Chapati"),
        category: FoodCategory::Bread,
        calories: 297,
        carbs: 43.0,
        fiber: 1.8,
        protein: 8.1,
        fat: 10.4,
        glycemic_index: 62,
        impact: ImpactTier::High,
        tips: LocalizedList::new(
            &[
                "Limit to 1 small chapati per meal",
                "Choose whole wheat chapati over white flour",
                "Eat with protein and vegetables",
                "Consider alternatives like cauliflower roti",
            ],
            &[
                "Jizuie kwa chapati moja ndogo kwa chakula",
                "Chagua chapati ya ngano nzima badala ya unga mweupe",
                "Kula na protini na mboga",
                "Fikiria mbadala kama roti ya cauliflower",
            ],
        ),
    },
    FoodEntry {
        key: "githeri",
        name: LocalizedText::new("Githeri (Maize & Beans)", "Githeri"),
        category: FoodCategory::LegumeGrain,
        calories: 130,
        carbs: 22.0,
        fiber: 6.2,
        protein: 6.8,
        fat: 1.2,
        glycemic_index: 45,
        impact: ImpactTier::Medium,
        tips: LocalizedList::new(
            &[
                "Good protein and fiber combination",
                "Portion control is key - 1 cup maximum",
                "Add vegetables to increase fiber",
                "Better choice than ugali alone",
            ],
            &[
                "Mchanganyiko mzuri wa protini na nyuzi",
                "Kudhibiti kipimo ni muhimu - kikombe 1 tu",
                "Ongeza mboga ili kuongeza nyuzi",
                "Chaguo bora kuliko ugali peke yake",
            ],
        ),
    },
    FoodEntry {
        key: "nyama_choma",
        name: LocalizedText::new("Nyama Choma (Grilled Meat)", "Nyama Choma"),
        category: FoodCategory::Protein,
        calories: 250,
        carbs: 0.0,
        fiber: 0.0,
        protein: 26.0,
        fat: 15.0,
        glycemic_index: 0,
        impact: ImpactTier::None,
        tips: LocalizedList::new(
            &[
                "Excellent protein source with no carbs",
                "Choose lean cuts when possible",
                "Limit processed meats",
                "Great with vegetable sides",
            ],
            &[
                "Chanzo bora cha protini bila kabohaidreti",
                "Chagua sehemu zenye mafuta machache ikiwezekana",
                "Punguza nyama zilizosindikwa",
                "Nzuri na mboga za pembeni",
            ],
        ),
    },
    FoodEntry {
        key: "mandazi",
        name: LocalizedText::new("Mandazi", "Mandazi"),
        category: FoodCategory::Snack,
        calories: 378,
        carbs: 45.0,
        fiber: 1.5,
        protein: 7.2,
        fat: 18.0,
        glycemic_index: 75,
        impact: ImpactTier::VeryHigh,
        tips: LocalizedList::new(
            &[
                "Avoid or eat very rarely",
                "If eating, limit to 1/2 piece maximum",
                "Check blood sugar frequently after eating",
                "Consider healthier alternatives like nuts",
            ],
            &[
                "Epuka au kula mara chache sana",
                "Ukikula, jizuie kwa kipande 1/2 tu",
                "Angalia sukari ya damu mara kwa mara baada ya kula",
                "Fikiria mbadala mzuri kama karanga",
            ],
        ),
    },
    FoodEntry {
        key: "sweet_potato",
        name: LocalizedText::new("Sweet Potato (Viazi Vitamu)", "Viazi Vitamu"),
        category: FoodCategory::Tuber,
        calories: 86,
        carbs: 20.0,
        fiber: 3.0,
        protein: 1.6,
        fat: 0.1,
        glycemic_index: 54,
        impact: ImpactTier::Medium,
        tips: LocalizedList::new(
            &[
                "Better choice than regular potatoes",
                "Eat with skin for more fiber",
                "Limit portion to 1 medium potato",
                "Boil or bake instead of frying",
            ],
            &[
                "Chaguo bora kuliko viazi vya kawaida",
                "Kula na ganda kwa nyuzi zaidi",
                "Jizuie kwa kiazi kimoja cha kati",
                "Chemsha au oka badala ya kukaanga",
            ],
        ),
    },
    FoodEntry {
        key: "terere",
        name: LocalizedText::new("Terere (Amaranth Leaves)", "Terere"),
        category: FoodCategory::Vegetable,
        calories: 23,
        carbs: 4.0,
        fiber: 3.0,
        protein: 2.5,
        fat: 0.3,
        glycemic_index: 15,
        impact: ImpactTier::Low,
        tips: LocalizedList::new(
            &[
                "Excellent diabetes-friendly vegetable",
                "High in nutrients, low in carbs",
                "Eat freely as side dish",
                "Rich in antioxidants",
            ],
            &[
                "Mboga bora sana kwa kisukari",
                "Ina virutubisho vingi, kabohaidreti chache",
                "Kula bila wasiwasi kama mboga ya pembeni",
                "Ina antioxidants nyingi",
            ],
        ),
    },
];

/// Normalize a user-supplied food name into a catalog key
pub fn lookup_key(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Find a food by name (case-insensitive, spaces treated as underscores)
pub fn find_food(name: &str) -> Option<&'static FoodEntry> {
    let key = lookup_key(name);
    FOOD_CATALOG.iter().find(|food| food.key == key)
}

pub fn all_foods() -> &'static [FoodEntry] {
    &FOOD_CATALOG
}

pub fn foods_by_impact(tier: ImpactTier) -> Vec<&'static FoodEntry> {
    FOOD_CATALOG.iter().filter(|food| food.impact == tier).collect()
}

/// Foods with low or no glucose impact
pub fn diabetes_friendly_foods() -> Vec<&'static FoodEntry> {
    FOOD_CATALOG
        .iter()
        .filter(|food| matches!(food.impact, ImpactTier::Low | ImpactTier::None))
        .collect()
}

/// Foods with high or very high glucose impact
pub fn foods_to_limit() -> Vec<&'static FoodEntry> {
    FOOD_CATALOG
        .iter()
        .filter(|food| matches!(food.impact, ImpactTier::High | ImpactTier::VeryHigh))
        .collect()
}

static TYPE1_DIET: LocalizedList = LocalizedList::new(
    &[
        "Focus on carb counting with ugali and chapati",
        "Sukuma wiki and terere are excellent choices",
        "Time insulin with high-carb foods like githeri",
        "Nyama choma provides protein without affecting blood sugar",
    ],
    &[
        "Zingatia kuhesabu kabohaidreti na ugali na chapati",
        "Sukuma wiki na terere ni chaguo bora",
        "Panga insulini na chakula chenye kabohaidreti nyingi kama githeri",
        "Nyama choma inatoa protini bila kuathiri sukari ya damu",
    ],
);

static TYPE2_DIET: LocalizedList = LocalizedList::new(
    &[
        "Limit ugali and chapati portions",
        "Fill half your plate with sukuma wiki and terere",
        "Choose githeri over ugali for better blood sugar control",
        "Avoid mandazi and other fried foods",
    ],
    &[
        "Punguza vipimo vya ugali na chapati",
        "Jaza nusu ya sahani yako na sukuma wiki na terere",
        "Chagua githeri badala ya ugali kwa kudhibiti sukari vizuri",
        "Epuka mandazi na vyakula vingine vya kukaanga",
    ],
);

/// Local diet guidance for a diabetes type. Only type 1 and type 2 have guidance.
pub fn diet_recommendations(diabetes_type: DiabetesType, locale: Locale) -> Vec<String> {
    match diabetes_type {
        DiabetesType::Type1 => TYPE1_DIET.get(locale),
        DiabetesType::Type2 => TYPE2_DIET.get(locale),
        DiabetesType::Gestational | DiabetesType::Prediabetes => Vec::new(),
    }
}

/// What to eat next given the current glucose status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatusFoodGuide {
    High {
        avoid: Vec<String>,
        recommended: Vec<String>,
        tips: String,
    },
    Low {
        immediate: Vec<String>,
        follow_up: Vec<String>,
        tips: String,
    },
    Normal {
        maintain: Vec<String>,
        snacks: Vec<String>,
        tips: String,
    },
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Local food guidance for a glucose status. Only `high` and `low` have
/// dedicated guidance; every other status gets the maintenance guide.
pub fn food_recommendations_by_status(status: GlucoseStatus) -> StatusFoodGuide {
    match status {
        GlucoseStatus::High => StatusFoodGuide::High {
            avoid: owned(&["Ugali", "White rice", "Chapati", "Mandazi", "Soda", "Fruit juice"]),
            recommended: owned(&[
                "Sukuma wiki",
                "Spinach",
                "Cabbage",
                "Tomatoes",
                "Cucumber",
                "Fish",
                "Chicken breast",
            ]),
            tips: "Focus on non-starchy vegetables and lean proteins. Drink plenty of water."
                .to_string(),
        },
        GlucoseStatus::Low => StatusFoodGuide::Low {
            immediate: owned(&[
                "Ripe banana",
                "Passion fruit juice",
                "Honey (1 tbsp)",
                "Glucose tablets",
            ]),
            follow_up: owned(&["Groundnuts", "Boiled eggs", "Milk", "Whole grain bread"]),
            tips: "Treat immediately with fast-acting carbs, then follow with protein.".to_string(),
        },
        GlucoseStatus::Normal | GlucoseStatus::Prediabetic | GlucoseStatus::Elevated => {
            StatusFoodGuide::Normal {
                maintain: owned(&[
                    "Balanced portions of ugali + vegetables",
                    "Fish with sukuma wiki",
                    "Beans and rice",
                    "Chicken with salad",
                ]),
                snacks: owned(&["Groundnuts", "Avocado", "Boiled eggs", "Greek yogurt"]),
                tips: "Maintain balance with controlled portions and regular meal timing."
                    .to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(foods: Vec<&'static FoodEntry>) -> Vec<&'static str> {
        foods.into_iter().map(|f| f.key).collect()
    }

    #[test]
    fn test_lookup_normalization() {
        assert_eq!(lookup_key("Sukuma Wiki"), "sukuma_wiki");
        assert_eq!(find_food("SWEET POTATO").unwrap().key, "sweet_potato");
        assert_eq!(find_food("  ugali ").unwrap().impact, ImpactTier::High);
        assert!(find_food("pizza").is_none());
    }

    #[test]
    fn test_catalog_keys_are_unique() {
        let mut all: Vec<&str> = FOOD_CATALOG.iter().map(|f| f.key).collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), FOOD_CATALOG.len());
    }

    #[test]
    fn test_impact_groupings() {
        assert_eq!(keys(foods_by_impact(ImpactTier::VeryHigh)), vec!["mandazi"]);
        assert_eq!(
            keys(diabetes_friendly_foods()),
            vec!["sukuma_wiki", "nyama_choma", "terere"]
        );
        assert_eq!(keys(foods_to_limit()), vec!["ugali", "chapati", "mandazi"]);
    }

    #[test]
    fn test_localized_listing() {
        let listing = find_food("githeri").unwrap().localized(Locale::Sw);
        assert_eq!(listing.name, "Githeri");
        assert_eq!(listing.diabetes_tips[3], "Chaguo bora kuliko ugali peke yake");

        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["glucose_impact"], "medium");
        assert_eq!(json["category"], "legume_grain");
    }

    #[test]
    fn test_diet_recommendations() {
        assert_eq!(diet_recommendations(DiabetesType::Type2, Locale::En).len(), 4);
        assert_eq!(
            diet_recommendations(DiabetesType::Type1, Locale::Sw)[1],
            "Sukuma wiki na terere ni chaguo bora"
        );
        assert!(diet_recommendations(DiabetesType::Gestational, Locale::En).is_empty());
    }

    #[test]
    fn test_impact_tier_parsing() {
        assert_eq!("very high".parse::<ImpactTier>().unwrap(), ImpactTier::VeryHigh);
        assert!("extreme".parse::<ImpactTier>().is_err());
    }

    #[test]
    fn test_food_guide_by_status() {
        match food_recommendations_by_status(GlucoseStatus::High) {
            StatusFoodGuide::High { avoid, recommended, .. } => {
                assert_eq!(avoid[0], "Ugali");
                assert_eq!(recommended.len(), 7);
            }
            other => panic!("unexpected guide: {:?}", other),
        }

        match food_recommendations_by_status(GlucoseStatus::Low) {
            StatusFoodGuide::Low { immediate, follow_up, .. } => {
                assert_eq!(immediate.len(), 4);
                assert_eq!(follow_up[0], "Groundnuts");
            }
            other => panic!("unexpected guide: {:?}", other),
        }

        // statuses without dedicated guidance get the maintenance guide
        let elevated = food_recommendations_by_status(GlucoseStatus::Elevated);
        assert_eq!(elevated, food_recommendations_by_status(GlucoseStatus::Normal));

        let json = serde_json::to_value(&elevated).unwrap();
        assert_eq!(json["status"], "normal");
        assert_eq!(json["snacks"][1], "Avocado");
    }
}
