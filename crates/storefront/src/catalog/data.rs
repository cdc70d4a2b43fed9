//! Sample catalog.

use rust_decimal::Decimal;

use aabhushan_core::{IdError, Price, ProductCategory, ProductId};

use crate::models::{Product, Specification};

const CARD_IMAGE: &str = "/assets/products/cardimage.png";
const PRODUCT_IMAGE: &str = "/assets/products/product1.png";

const STANDARD_SHIPPING: &[&str] = &[
    "Free insured shipping on all orders",
    "Delivery within 7-10 business days",
    "International shipping available",
    "Signature required on delivery",
    "Express shipping available for additional cost",
];

const CUSTOM_SHIPPING: &[&str] = &[
    "Free insured shipping on all orders",
    "Delivery within 15-20 business days (custom made)",
    "International shipping available",
    "Signature required on delivery",
    "White glove delivery service available",
];

struct Draft {
    category: ProductCategory,
    id: &'static str,
    name: &'static str,
    price: i64,
    original_price: Option<i64>,
    description: &'static str,
    full_description: Option<&'static str>,
    image: &'static str,
    image_count: usize,
    specifications: &'static [(&'static str, &'static str)],
    additional_info: &'static [&'static str],
    shipping_return_policy: &'static [&'static str],
    featured: bool,
    rating: Option<(i64, u32)>,
}

const fn draft(
    category: ProductCategory,
    id: &'static str,
    name: &'static str,
    price: i64,
    description: &'static str,
) -> Draft {
    Draft {
        category,
        id,
        name,
        price,
        original_price: None,
        description,
        full_description: None,
        image: PRODUCT_IMAGE,
        image_count: 1,
        specifications: &[],
        additional_info: &[],
        shipping_return_policy: &[],
        featured: false,
        rating: None,
    }
}

impl Draft {
    const fn was(mut self, original: i64) -> Self {
        self.original_price = Some(original);
        self
    }

    const fn featured(mut self) -> Self {
        self.featured = true;
        self
    }

    const fn images(mut self, primary: &'static str, count: usize) -> Self {
        self.image = primary;
        self.image_count = count;
        self
    }

    const fn full(mut self, text: &'static str) -> Self {
        self.full_description = Some(text);
        self
    }

    const fn specs(mut self, rows: &'static [(&'static str, &'static str)]) -> Self {
        self.specifications = rows;
        self
    }

    const fn info(mut self, lines: &'static [&'static str], shipping: &'static [&'static str]) -> Self {
        self.additional_info = lines;
        self.shipping_return_policy = shipping;
        self
    }

    const fn rated(mut self, tenths: i64, reviews: u32) -> Self {
        self.rating = Some((tenths, reviews));
        self
    }

    fn build(self) -> Result<Product, IdError> {
        let price = Price::inr(self.price);
        Ok(Product {
            id: ProductId::parse(self.id)?,
            name: self.name.to_owned(),
            category: self.category,
            price,
            original_price: self.original_price.map(Price::inr),
            price_display: price.display(),
            image: self.image.to_owned(),
            images: vec![self.image.to_owned(); self.image_count],
            description: self.description.to_owned(),
            full_description: self.full_description.map(String::from),
            specifications: self
                .specifications
                .iter()
                .map(|(label, value)| Specification {
                    label: (*label).to_owned(),
                    value: (*value).to_owned(),
                })
                .collect(),
            additional_info: self.additional_info.iter().map(|l| (*l).to_owned()).collect(),
            shipping_return_policy: self
                .shipping_return_policy
                .iter()
                .map(|l| (*l).to_owned())
                .collect(),
            in_stock: true,
            featured: self.featured,
            rating: self.rating.map(|(tenths, _)| Decimal::new(tenths, 1)),
            reviews: self.rating.map_or(0, |(_, reviews)| reviews),
        })
    }
}

/// Every sample product, grouped by category in navigation order.
///
/// # Errors
///
/// Returns `IdError` if a product id literal is invalid.
pub fn sample_products() -> Result<Vec<Product>, IdError> {
    [
        fine_jewellery(),
        shringaar(),
        crystals(),
        kalapatt(),
        wooden_beads(),
        treasured_gifts(),
    ]
    .into_iter()
    .flatten()
    .map(Draft::build)
    .collect()
}

fn fine_jewellery() -> Vec<Draft> {
    use ProductCategory::FineJewellery as FJ;
    vec![
        draft(FJ, "fj-001", "Elegant Diamond Necklace", 45000,
            "Exquisite diamond necklace crafted with precision and elegance. Carefully selected diamonds set in premium gold, made for special occasions and formal events.")
            .images(CARD_IMAGE, 4)
            .info(&[
                "Material: 18K Gold with Natural Diamonds",
                "Diamond Weight: 2.5 carats",
                "Chain Length: 16-18 inches (adjustable)",
                "Diamond Clarity: VS1-VS2",
                "Diamond Color: F-G",
                "Certification: GIA Certified",
            ], STANDARD_SHIPPING),
        draft(FJ, "fj-002", "Royal Gold Earrings", 25000,
            "Beautiful gold earrings with intricate design patterns, handcrafted by skilled artisans using traditional techniques.")
            .images(CARD_IMAGE, 3)
            .info(&[
                "Material: 22K Gold",
                "Design: Traditional Indian Pattern",
                "Weight: 8.2 grams",
                "Closure: Push Back",
                "Origin: Rajasthan, India",
            ], STANDARD_SHIPPING),
        draft(FJ, "fj-003", "Premium Gemstone Ring", 35000,
            "Stunning gemstone ring featuring a rare precious stone set in pure gold. Each piece is unique and comes with an authenticity certificate.")
            .images(CARD_IMAGE, 2)
            .info(&[
                "Material: 18K Gold with Natural Gemstone",
                "Gemstone: Natural Ruby",
                "Gemstone Weight: 3.2 carats",
                "Ring Size: Adjustable (6-8)",
                "Setting: Prong Setting",
            ], STANDARD_SHIPPING),
        draft(FJ, "fj-004", "Classic Pearl Bracelet", 18000,
            "Timeless pearl bracelet with lustrous natural pearls, matched for size, shape and luster.")
            .images(CARD_IMAGE, 4)
            .info(&[
                "Material: Natural Freshwater Pearls",
                "Pearl Size: 6-7mm",
                "Clasp: Sterling Silver",
                "Length: 7.5 inches",
                "Grade: AAA Quality",
            ], STANDARD_SHIPPING),
        draft(FJ, "fj-005", "Luxury Diamond Pendant", 0,
            "Exclusive diamond pendant featuring rare diamonds, custom-made on special order.")
            .images(CARD_IMAGE, 3)
            .info(&[
                "Material: Platinum with Rare Diamonds",
                "Diamond Weight: 5+ carats",
                "Design: Custom Made",
                "Chain: Platinum 18 inches",
                "Availability: Made to Order",
            ], CUSTOM_SHIPPING),
        draft(FJ, "fj-006", "Vintage Gold Chain", 22000,
            "Beautiful vintage-inspired gold chain with antique finish, for layering or as a statement piece.")
            .images(CARD_IMAGE, 3)
            .info(&[
                "Material: 22K Gold",
                "Chain Type: Rope Chain",
                "Length: 20 inches",
                "Clasp: Lobster Clasp",
                "Finish: Antique Polish",
            ], STANDARD_SHIPPING),
        draft(FJ, "fj-007", "Emerald Statement Ring", 42000,
            "Magnificent emerald ring with intricate gold work. The emerald is sourced from Colombia and features exceptional color and clarity.")
            .images(CARD_IMAGE, 3)
            .info(&[
                "Material: 18K Gold with Natural Emerald",
                "Emerald Weight: 4.1 carats",
                "Ring Size: 6 (resizable)",
                "Setting: Halo Setting with Diamonds",
                "Certification: Gübelin Certified",
            ], STANDARD_SHIPPING),
        draft(FJ, "fj-008", "Designer Diamond Brooch", 28000,
            "Elegant diamond brooch with artistic design, combining traditional elegance with contemporary flair.")
            .images(CARD_IMAGE, 3)
            .info(&[
                "Material: 18K White Gold with Diamonds",
                "Total Diamond Weight: 1.8 carats",
                "Design: Floral Motif",
                "Pin Type: Safety Pin Back",
                "Style: Art Deco Inspired",
            ], STANDARD_SHIPPING),
    ]
}

fn shringaar() -> Vec<Draft> {
    use ProductCategory::Shringaar as SH;
    vec![
        draft(SH, "1", "Traditional Kundan Maang Tikka", 8500,
            "Exquisite kundan maang tikka with traditional Indian motifs. Perfect for weddings and festivals.")
            .was(10000)
            .featured()
            .full("Intricate traditional designs with high-quality kundan stones set in gold-plated metal, handcrafted by skilled artisans.")
            .specs(&[
                ("Metal", "Gold Plated Brass"),
                ("Stones", "Kundan & Pearls"),
                ("Length", "4 inches"),
                ("Weight", "45 grams"),
                ("Occasion", "Wedding, Festival"),
            ])
            .rated(47, 32),
        draft(SH, "2", "Bridal Nath (Nose Ring)", 6500,
            "Beautiful traditional nath with pearl drops and intricate gold work.")
            .was(7500)
            .images(CARD_IMAGE, 3)
            .full("Delicate pearl drops and intricate gold work, made for brides and special occasions.")
            .specs(&[
                ("Metal", "22k Gold Plated"),
                ("Pearls", "Freshwater Pearls"),
                ("Diameter", "2.5 inches"),
                ("Chain Length", "6 inches"),
                ("Closure", "Secure clip"),
            ])
            .rated(46, 18),
        draft(SH, "3", "Antique Jhumka Earrings", 4200,
            "Traditional antique finish jhumka earrings with temple-inspired designs.")
            .was(5000)
            .full("Antique finish with temple-inspired designs and traditional motifs for ethnic wear and cultural celebrations.")
            .specs(&[
                ("Metal", "Antique Gold Finish"),
                ("Design", "Temple Inspired"),
                ("Length", "2.5 inches"),
                ("Weight", "25 grams"),
                ("Closure", "Hook style"),
            ])
            .rated(48, 25),
    ]
}

fn crystals() -> Vec<Draft> {
    use ProductCategory::Crystals as CR;
    vec![
        draft(CR, "cr-001", "Amethyst Healing Crystal", 1200,
            "Natural amethyst crystal for spiritual healing and meditation.")
            .was(1500)
            .featured()
            .specs(&[
                ("Crystal Type", "Natural Amethyst"),
                ("Size", "3-4 inches"),
                ("Origin", "Brazil"),
                ("Chakra", "Crown & Third Eye"),
            ])
            .rated(48, 45),
        draft(CR, "cr-002", "Rose Quartz Heart Set", 800,
            "Beautiful rose quartz hearts for love and emotional healing.")
            .was(1000)
            .specs(&[
                ("Crystal Type", "Natural Rose Quartz"),
                ("Shape", "Heart"),
                ("Chakra", "Heart Chakra"),
            ])
            .rated(47, 32),
        draft(CR, "cr-003", "7 Chakra Crystal Set", 2500,
            "Complete set of 7 chakra crystals for energy balancing.")
            .was(3000)
            .featured(),
    ]
}

fn kalapatt() -> Vec<Draft> {
    use ProductCategory::Kalapatt as KP;
    vec![
        draft(KP, "kp-001", "Handcrafted Marble Sculpture", 8500,
            "Exquisite handcrafted marble sculpture with intricate detailing.")
            .was(9500)
            .featured(),
        draft(KP, "kp-002", "Traditional Brass Lamp", 3200,
            "Beautiful brass lamp with traditional Indian motifs.")
            .was(3800),
        draft(KP, "kp-003", "Wooden Handicraft Set", 4500,
            "Set of wooden handicrafts showcasing Indian artistry.")
            .was(5000)
            .featured(),
    ]
}

fn wooden_beads() -> Vec<Draft> {
    use ProductCategory::WoodenBeads as WB;
    vec![
        draft(WB, "wb-001", "Sandalwood Mala Beads", 1800,
            "Traditional sandalwood mala beads for meditation and prayer.")
            .was(2200)
            .featured()
            .specs(&[
                ("Wood Type", "Genuine Sandalwood"),
                ("Bead Count", "108 + 1 Guru Bead"),
                ("Bead Size", "8mm"),
                ("Length", "34 inches"),
            ])
            .rated(49, 56),
        draft(WB, "wb-002", "Rosewood Bracelet Set", 900,
            "Handcrafted rosewood bracelet set with natural finish.")
            .was(1200),
        draft(WB, "wb-003", "Tulsi Bead Necklace", 650,
            "Sacred tulsi bead necklace for spiritual protection.")
            .was(800)
            .featured(),
    ]
}

fn treasured_gifts() -> Vec<Draft> {
    use ProductCategory::TreasuredGifts as TG;
    vec![
        draft(TG, "tg-001", "Luxury Gift Hamper", 5500,
            "Curated luxury gift hamper with premium artisanal items.")
            .was(6500)
            .featured(),
        draft(TG, "tg-002", "Silver Plated Photo Frame", 2200,
            "Elegant silver plated photo frame for cherished memories.")
            .was(2800),
        draft(TG, "tg-003", "Handwoven Silk Scarf", 3200,
            "Luxurious handwoven silk scarf with traditional patterns.")
            .was(3800)
            .featured(),
    ]
}
