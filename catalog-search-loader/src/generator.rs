//! Synthetic product catalog generator.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use catalog_search_shared::Product;

const BRANDS: &[&str] = &[
    "Apple",
    "Samsung",
    "Dell",
    "HP",
    "Lenovo",
    "Asus",
    "Acer",
    "Microsoft",
    "LG",
    "Sony",
    "Intel",
    "AMD",
    "Razer",
    "MSI",
    "Toshiba",
];

const CATEGORIES: &[&str] = &[
    "Laptops",
    "Smartphones",
    "Tablets",
    "Desktops",
    "Monitors",
    "Accessories",
    "Gaming",
    "Office",
    "Student",
    "Professional",
];

const PRODUCT_TYPES: &[&str] = &[
    "Laptop",
    "Smartphone",
    "Tablet",
    "Desktop",
    "Monitor",
    "Keyboard",
    "Mouse",
    "Headphones",
    "Camera",
    "Printer",
];

const ADJECTIVES: &[&str] = &[
    "Professional",
    "Gaming",
    "Ultra",
    "Premium",
    "Basic",
    "Advanced",
    "Smart",
    "Portable",
    "Powerful",
    "Lightweight",
];

const FEATURES: &[&str] = &[
    "4K Display",
    "Touch Screen",
    "Fast Charging",
    "Wireless",
    "Bluetooth",
    "High Performance",
    "Long Battery Life",
    "Ergonomic Design",
    "RGB Lighting",
    "Compact",
];

/// Configuration for the product generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Fixed RNG seed for reproducible catalogs. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Id of the first generated product.
    pub start_id: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            start_id: 1,
        }
    }
}

/// Generates plausible electronics products.
///
/// Also an endless iterator, so a catalog of `n` products is
/// `generator.by_ref().take(n)`.
pub struct ProductGenerator {
    rng: StdRng,
    next_id: u64,
    now: DateTime<Utc>,
}

impl ProductGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self::with_clock(config, Utc::now())
    }

    /// Generator whose `created_at` values are relative to `now`.
    pub fn with_clock(config: GeneratorConfig, now: DateTime<Utc>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            next_id: config.start_id,
            now,
        }
    }

    fn pick(&mut self, values: &[&'static str]) -> &'static str {
        values[self.rng.gen_range(0..values.len())]
    }

    /// Generate the next product.
    pub fn generate(&mut self) -> Product {
        let id = self.next_id;
        self.next_id += 1;

        let product_type = self.pick(PRODUCT_TYPES);
        let adjective = self.pick(ADJECTIVES);
        let brand = self.pick(BRANDS);
        let feature1 = self.pick(FEATURES);
        let feature2 = self.pick(FEATURES);

        let category_count = self.rng.gen_range(2..=3);
        let mut categories: Vec<String> = Vec::with_capacity(category_count);
        while categories.len() < category_count {
            let category = self.pick(CATEGORIES);
            if !categories.iter().any(|c| c == category) {
                categories.push(category.to_string());
            }
        }

        // Price in [100, 3000), truncated to cents
        let price = 100.0 + self.rng.gen::<f64>() * 2900.0;
        let price = (price * 100.0).trunc() / 100.0;

        let in_stock = self.rng.gen_bool(0.8);
        let rating = 1.0 + self.rng.gen::<f64>() * 4.0;
        let age_days = self.rng.gen_range(0..365);

        Product {
            id: id.to_string(),
            name: format!("{} {} {}", brand, adjective, product_type),
            description: format!(
                "A {} {} featuring {} and {}. Perfect for daily use.",
                adjective, product_type, feature1, feature2
            ),
            price,
            categories,
            brand: brand.to_string(),
            in_stock,
            rating,
            created_at: Some(self.now - Duration::days(age_days)),
        }
    }
}

impl Iterator for ProductGenerator {
    type Item = Product;

    fn next(&mut self) -> Option<Product> {
        Some(self.generate())
    }
}
