//! Product Aggregate and the static catalog

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{calc_discount, Money};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub price: Money,
    pub mrp: Money,
    pub description: String,
    #[serde(default)]
    pub tagline: String,
    pub key_features: Vec<String>,
    pub cod_available: bool,
}

impl Product {
    pub fn discount_percent(&self) -> i64 { calc_discount(self.price, self.mrp) }

    fn matches(&self, needle: &str) -> bool {
        [&self.name, &self.tagline, &self.description]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField { PriceAscending, PriceDescending }

/// Filters accepted by [`Catalog::query`], the same shape the remote service takes.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub sort: Option<SortField>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Read-only product list. Cart and order lines join against it by id.
#[derive(Clone, Debug)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self { Self { products } }

    /// The five products the storefront ships with.
    pub fn builtin() -> Self {
        Self::new(vec![
            item(
                "1",
                "AuraBuds Pro",
                "https://m.media-amazon.com/images/I/51f1YbJdQBL._AC_UF1000,1000_QL80_.jpg",
                1999,
                2999,
                "The AuraBuds Pro were built for people who refuse to blend in. Powerful active noise cancellation keeps distractions at bay while rich, bass-forward audio pulls you deep into whatever you're listening to. LED pulse rings react to your music in real time. Sweat-resistant with touch controls and a 30-hour combined battery.",
                "\"Your sound. Your light. Your way.\"",
                &["ANC (Active Noise Cancellation)", "30hr Battery Life", "Touch Controls", "IPX5 Water Resistant"],
            ),
            item(
                "2",
                "NightDock",
                "https://www.ultraprolink.com/cdn/shop/products/UM1006N.jpg?v=1754570585",
                2499,
                3999,
                "Charge your phone, earbuds, and smartwatch simultaneously with 15W fast charging. Features multiple RGB lighting modes, app control, and a built-in phone stand for a clean desk setup.",
                "\"Charge everything. Light up the room.\"",
                &["3-Device Charging", "16M RGB Lighting", "15W Fast Charge", "Built-in Phone Stand"],
            ),
            item(
                "3",
                "SnapGrip",
                "https://dimensiva.com/wp-content/uploads/edd/2021/07/magsafe-battery-pack-by-apple-1024x1024.jpg",
                999,
                1499,
                "Provides a secure one-handed grip, doubles as a kickstand, and stores up to 3 cards. Compatible with MagSafe and most Android phones.",
                "\"Less to carry. More control.\"",
                &["Magnetic Lock", "3-Card Wallet", "Kickstand", "Ultra-Slim Design"],
            ),
            item(
                "4",
                "HyperKey",
                "https://images-cdn.ubuy.co.in/686d4ba05282f1edcc00aa03-magegee-mini-60-gaming-keyboard-rgb.jpg",
                1799,
                2599,
                "Connect up to 3 devices and switch instantly. Quiet tactile keys, backlit modes, and rechargeable battery make it perfect for students and professionals.",
                "\"Pocket-sized. Full power.\"",
                &["3-Device Bluetooth", "Backlit Keys", "Rechargeable Battery", "Multi-OS Support"],
            ),
            item(
                "5",
                "LumiCam",
                "https://m.media-amazon.com/images/I/31l1nb1g-rS._AC_UF1000,1000_QL80_.jpg",
                799,
                1299,
                "Offers warm and cool tones, 3 brightness levels, USB-C charging, and a foldable design for easy portability.",
                "\"Great light. Anywhere.\"",
                &["3 Brightness Levels", "Warm/Cool Tones", "USB-C Charging", "Foldable Design"],
            ),
        ])
    }

    pub fn products(&self) -> &[Product] { &self.products }
    pub fn get(&self, id: &str) -> Option<&Product> { self.products.iter().find(|p| p.id == id) }
    pub fn contains(&self, id: &str) -> bool { self.get(id).is_some() }

    pub fn query(&self, query: &ProductQuery) -> Vec<Product> {
        let needle = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_lowercase);
        let mut found: Vec<Product> = self
            .products
            .iter()
            .filter(|p| needle.as_deref().map_or(true, |n| p.matches(n)))
            .cloned()
            .collect();
        match query.sort {
            Some(SortField::PriceAscending) => found.sort_by_key(|p| p.price),
            Some(SortField::PriceDescending) => found.sort_by(|a, b| b.price.cmp(&a.price)),
            None => {}
        }
        found
            .into_iter()
            .skip(query.offset.unwrap_or(0))
            .take(query.limit.unwrap_or(usize::MAX))
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self { Self::builtin() }
}

#[allow(clippy::too_many_arguments)]
fn item(
    id: &str,
    name: &str,
    image_url: &str,
    price: i64,
    mrp: i64,
    description: &str,
    tagline: &str,
    key_features: &[&str],
) -> Product {
    Product {
        id: id.into(),
        name: name.into(),
        image_url: image_url.into(),
        price: Money::new(price),
        mrp: Money::new(mrp),
        description: description.into(),
        tagline: tagline.into(),
        key_features: key_features.iter().map(|f| f.to_string()).collect(),
        cod_available: true,
    }
}
