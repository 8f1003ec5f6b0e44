//! The menu: dish categories, their preparation times, and the client roster the
//! generator draws names from.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DishCategory {
    Appetizer,
    Salad,
    Soup,
    MainCourse,
    SideDish,
    Dessert,
    Drink,
}

impl DishCategory {
    pub const ALL: [DishCategory; 7] = [
        DishCategory::Appetizer,
        DishCategory::Salad,
        DishCategory::Soup,
        DishCategory::MainCourse,
        DishCategory::SideDish,
        DishCategory::Dessert,
        DishCategory::Drink,
    ];

    /// How long a cook spends on a dish of this category.
    pub fn prep_time(self) -> Duration {
        let millis = match self {
            DishCategory::Appetizer => 1000,
            DishCategory::Salad => 1200,
            DishCategory::Soup => 2000,
            DishCategory::MainCourse => 3500,
            DishCategory::SideDish => 1500,
            DishCategory::Dessert => 1800,
            DishCategory::Drink => 300,
        };
        Duration::from_millis(millis)
    }

    pub fn dishes(self) -> &'static [&'static str] {
        match self {
            DishCategory::Appetizer => &["Bruschetta", "Shrimp Cocktail", "Stuffed Mushrooms"],
            DishCategory::Salad => &["Caesar Salad", "Greek Salad", "Olivier Salad"],
            DishCategory::Soup => &["Borscht", "Mushroom Soup", "Chicken Noodle Soup"],
            DishCategory::MainCourse => &["Beef Steak", "Grilled Salmon", "Chicken Kiev"],
            DishCategory::SideDish => &["Mashed Potatoes", "Grilled Vegetables", "Rice Pilaf"],
            DishCategory::Dessert => &["Cheesecake", "Tiramisu", "Apple Pie"],
            DishCategory::Drink => &["Lemonade", "Black Tea", "Espresso"],
        }
    }

    pub fn random(rng: &mut impl Rng) -> DishCategory {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// A dish from this category. Every category lists at least one dish.
    pub fn random_dish(self, rng: &mut impl Rng) -> &'static str {
        self.dishes().choose(rng).copied().unwrap_or("Chef's Special")
    }
}

impl Display for DishCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DishCategory::Appetizer => "Appetizer",
            DishCategory::Salad => "Salad",
            DishCategory::Soup => "Soup",
            DishCategory::MainCourse => "Main course",
            DishCategory::SideDish => "Side dish",
            DishCategory::Dessert => "Dessert",
            DishCategory::Drink => "Drink",
        };
        f.write_str(label)
    }
}

impl FromStr for DishCategory {
    type Err = String;

    /// Accepts `main_course`, `main-course`, `MainCourse` and `main course` alike.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::ALL
            .into_iter()
            .find(|category| format!("{:?}", category).to_ascii_lowercase() == key)
            .ok_or_else(|| format!("unknown dish category: {}", s))
    }
}

/// Names the order generator picks clients from.
pub const CLIENT_NAMES: [&str; 10] = [
    "Ivan Ivanov",
    "Maria Petrova",
    "Alexei Smirnov",
    "Elena Kuznetsova",
    "Dmitry Sokolov",
    "Olga Popova",
    "Sergei Lebedev",
    "Anna Kozlova",
    "Pavel Novikov",
    "Natalia Morozova",
];

pub fn random_client(rng: &mut impl Rng) -> &'static str {
    CLIENT_NAMES[rng.gen_range(0..CLIENT_NAMES.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prep_times_match_menu() {
        assert_eq!(DishCategory::MainCourse.prep_time(), Duration::from_millis(3500));
        assert_eq!(DishCategory::Drink.prep_time(), Duration::from_millis(300));
        let longest = DishCategory::ALL.iter().map(|c| c.prep_time()).max();
        assert_eq!(longest, Some(Duration::from_millis(3500)));
    }

    #[test]
    fn test_every_category_has_dishes() {
        let mut rng = rand::thread_rng();
        for category in DishCategory::ALL {
            let dish = category.random_dish(&mut rng);
            assert!(category.dishes().contains(&dish));
        }
    }

    #[test]
    fn test_parse_category_is_lenient() {
        assert_eq!("main_course".parse(), Ok(DishCategory::MainCourse));
        assert_eq!("Side-Dish".parse(), Ok(DishCategory::SideDish));
        assert_eq!("drink".parse(), Ok(DishCategory::Drink));
        assert!("pizza".parse::<DishCategory>().is_err());
    }
}
