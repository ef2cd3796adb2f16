//! The fixed training corpus.
//!
//! Examples are grouped into one block per category so every description
//! carries its label by construction.

use crate::Category;

/// A single labelled description used for training
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    pub description: String,
    pub category: Category,
}

impl TrainingExample {
    pub fn new(description: impl Into<String>, category: Category) -> Self {
        Self {
            description: description.into(),
            category,
        }
    }
}

const FOOD: &[&str] = &[
    "lunch at restaurant", "dinner with friends", "groceries from supermarket",
    "breakfast coffee", "pizza delivery", "fast food burger", "sushi takeout",
    "grocery shopping", "food delivery", "restaurant bill", "cafe latte",
    "starbucks coffee", "mcdonalds meal", "subway sandwich", "dominos pizza",
    "ice cream", "snacks chips", "fruits vegetables", "meat chicken",
    "bakery bread", "candy chocolate", "food court meal", "buffet dinner",
];

const TRAVEL: &[&str] = &[
    "uber ride", "taxi fare", "bus ticket", "train ticket", "flight booking",
    "hotel accommodation", "airbnb stay", "car rental", "gas fuel",
    "parking fee", "metro card", "toll fee", "airport shuttle",
    "vacation package", "travel insurance", "lyft ride", "ola cab",
    "bike rental", "road trip", "cruise booking", "travel visa",
];

// netflix/spotify/hulu sit here on purpose: recurring subscriptions are bills.
const BILLS: &[&str] = &[
    "electricity bill", "water bill", "internet bill", "phone bill",
    "rent payment", "insurance premium", "credit card payment", "loan emi",
    "gas bill", "cable tv", "netflix subscription", "spotify premium",
    "gym membership", "utility payment", "mortgage payment", "property tax",
    "youtube premium", "amazon prime", "hulu subscription", "medical insurance",
];

const SHOPPING: &[&str] = &[
    "clothing purchase", "shoes shopping", "electronics store", "furniture buy",
    "book purchase", "online shopping", "amazon order", "walmart shopping",
    "target purchase", "ebay order", "home decor", "cosmetics beauty",
    "jewelry purchase", "toy store", "sports equipment", "garden supplies",
    "office supplies", "hardware store", "pet supplies", "gift purchase",
    "laptop computer", "mobile phone", "headphones", "watch",
];

const ENTERTAINMENT: &[&str] = &[
    "movie tickets", "concert tickets", "theater show", "museum entry",
    "theme park", "bowling alley", "video games", "streaming service",
    "sports event", "comedy show", "bar drinks", "nightclub cover",
    "casino gambling", "arcade games", "mini golf", "escape room",
    "zoo tickets", "aquarium visit", "festival pass", "hobby class",
    "books magazine", "music album", "app purchase", "game subscription",
];

const BLOCKS: [(Category, &[&str]); 5] = [
    (Category::Food, FOOD),
    (Category::Travel, TRAVEL),
    (Category::Bills, BILLS),
    (Category::Shopping, SHOPPING),
    (Category::Entertainment, ENTERTAINMENT),
];

/// Returns the built-in corpus in block order
pub fn training_examples() -> Vec<TrainingExample> {
    BLOCKS
        .iter()
        .flat_map(|(category, descriptions)| {
            descriptions
                .iter()
                .map(move |d| TrainingExample::new(*d, *category))
        })
        .collect()
}

/// Number of built-in examples per category, in category order
pub fn block_sizes() -> Vec<(Category, usize)> {
    BLOCKS.iter().map(|(c, d)| (*c, d.len())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_sizes() {
        assert_eq!(
            block_sizes(),
            vec![
                (Category::Food, 23),
                (Category::Travel, 21),
                (Category::Bills, 20),
                (Category::Shopping, 24),
                (Category::Entertainment, 24),
            ]
        );
        assert_eq!(training_examples().len(), 112);
    }

    #[test]
    fn test_labels_follow_blocks() {
        let examples = training_examples();
        assert_eq!(examples[0], TrainingExample::new("lunch at restaurant", Category::Food));
        assert_eq!(examples[23], TrainingExample::new("uber ride", Category::Travel));
        assert_eq!(examples[54].category, Category::Bills);
        assert_eq!(examples[54].description, "netflix subscription");
        assert_eq!(examples[111], TrainingExample::new("game subscription", Category::Entertainment));
    }
}
