//! 組み込み辞書プリセット
//!
//! 雑貨・テーブルウェア系ショップ向けのキーワード表。
//! `feedcat dictionary --export` でJSONに書き出して編集できる。

use crate::dictionary::{ContextGroup, FallbackPattern, KeywordDictionary};
use crate::types::CategoryId;

const KEYWORDS: &[(&str, u64)] = &[
    // ドリンクウェア
    ("coffee cup", 6049), ("coffee cups", 6049), ("tea cup", 6049), ("tea cups", 6049),
    ("espresso cup", 6049), ("cappuccino cup", 6049), ("latte cup", 6049),
    ("mug", 2169), ("mugs", 2169), ("coffee mug", 2169), ("tea mug", 2169),
    ("tumbler", 2951), ("tumblers", 2951), ("travel mug", 2951), ("insulated mug", 2951),
    ("glass", 674), ("glasses", 674), ("drinking glass", 674), ("water glass", 674),
    ("wine glass", 674), ("beer glass", 674), ("cocktail glass", 674),
    ("cup", 6049), ("cups", 6049), ("teacup", 6049),
    // ディナーウェア
    ("dinner plate", 3553), ("dessert plate", 3553), ("serving plate", 3553), ("salad plate", 3553),
    ("plate", 3553), ("plates", 3553), ("ceramic plate", 3553), ("porcelain plate", 3553),
    ("charger plate", 3553), ("side plate", 3553), ("bread plate", 3553),
    ("deep plate", 3498), ("bowl", 3498), ("bowls", 3498), ("serving bowl", 3498),
    ("dish", 3498), ("dishes", 3498), ("pasta bowl", 3498), ("cereal bowl", 3498),
    ("soup bowl", 3498), ("salad bowl", 3498), ("mixing bowl", 3498), ("fruit bowl", 3498),
    ("rice bowl", 3498), ("noodle bowl", 3498), ("ramen bowl", 3498),
    // サーブウェア
    ("serving tray", 4009), ("tray", 4009), ("trays", 4009), ("platter", 4009),
    ("cheese board", 4009), ("cutting board", 4009), ("serving board", 4009),
    ("jug", 3330), ("pitcher", 3330), ("serving pitcher", 3330), ("carafe", 3330),
    ("water jug", 3330), ("milk jug", 3330), ("gravy boat", 3330), ("sauce boat", 3330),
    ("teapot", 3330), ("coffee pot", 3330), ("creamer", 3330), ("sugar bowl", 3330),
    // インテリア
    ("vase", 602), ("vases", 602), ("flower vase", 602), ("decorative vase", 602),
    ("bud vase", 602), ("floor vase", 602), ("table vase", 602),
    ("trinket tray", 6456), ("decorative tray", 6456), ("jewelry tray", 6456), ("catchall tray", 6456),
    ("ornament", 602), ("decoration", 602), ("figurine", 602), ("sculpture", 602),
    ("statue", 602), ("decorative object", 602), ("accent piece", 602),
    // フォトフレーム・壁面装飾
    ("photo frame", 3367), ("picture frame", 3367), ("frame", 3367), ("frames", 3367),
    ("wall art", 500044), ("artwork", 500044), ("painting", 500044), ("print", 500044),
    ("poster", 500044), ("canvas", 500044), ("wall decor", 500044),
    ("mirror", 583), ("mirrors", 583), ("wall mirror", 583), ("decorative mirror", 583),
    // 香水
    ("perfume", 2915), ("cologne", 2915), ("fragrance", 2915), ("eau de parfum", 2915),
    ("eau de toilette", 2915), ("eau de cologne", 2915), ("scent", 2915),
    ("oud", 2915), ("oud perfume", 2915), ("oud fragrance", 2915), ("arabic perfume", 2915),
    ("attar", 2915), ("essential oil", 2915), ("perfume oil", 2915),
    ("body spray", 2915), ("body mist", 2915), ("aftershave", 2915),
    // ホームフレグランス
    ("candle holder", 2784), ("candle", 588), ("candles", 588), ("scented candle", 588),
    ("tea light", 588), ("pillar candle", 588), ("votive candle", 588), ("jar candle", 588),
    ("candlestick", 2784), ("candelabra", 2784), ("lantern", 2784), ("oil lamp", 2784),
    ("diffuser", 2915), ("reed diffuser", 2915), ("air freshener", 2915),
    ("incense", 588), ("incense burner", 2784), ("wax melt", 588),
    // カトラリー
    ("spoon", 3939), ("spoons", 3939), ("teaspoon", 3939), ("tablespoon", 3939),
    ("soup spoon", 3939), ("dessert spoon", 3939), ("serving spoon", 3939),
    ("fork", 4015), ("forks", 4015), ("dinner fork", 4015), ("salad fork", 4015),
    ("dessert fork", 4015), ("serving fork", 4015),
    ("knife", 3844), ("knives", 3844), ("butter knife", 3844), ("steak knife", 3844),
    ("dinner knife", 3844), ("cheese knife", 3844),
    ("cutlery", 3939), ("flatware", 3939), ("silverware", 3939), ("utensils", 3939),
    // 調理器具
    ("pot", 663), ("pots", 663), ("stock pot", 663), ("soup pot", 663), ("sauce pot", 663),
    ("pan", 662), ("pans", 662), ("frying pan", 662), ("skillet", 662), ("saute pan", 662),
    ("baking pan", 641), ("cookie sheet", 641), ("baking tray", 641), ("sheet pan", 641),
    ("casserole", 663), ("dutch oven", 663), ("roasting pan", 641), ("cake pan", 641),
    ("muffin pan", 641), ("loaf pan", 641), ("pie pan", 641),
    // 収納
    ("jar", 674), ("jars", 674), ("storage jar", 674), ("cookie jar", 674), ("spice jar", 674),
    ("bottle", 674), ("bottles", 674), ("water bottle", 674), ("wine bottle", 674),
    ("container", 674), ("containers", 674), ("food container", 674), ("storage box", 674),
    ("basket", 574), ("baskets", 574), ("storage basket", 574), ("wicker basket", 574),
    // テーブルリネン
    ("tablecloth", 1985), ("table cloth", 1985), ("table linen", 1985),
    ("napkin", 1985), ("napkins", 1985), ("table napkin", 1985),
    ("placemat", 1985), ("placemats", 1985), ("table mat", 1985),
    ("runner", 1985), ("table runner", 1985), ("linen runner", 1985),
    ("coaster", 1985), ("coasters", 1985), ("drink coaster", 1985),
    // 照明
    ("lamp", 594), ("lamps", 594), ("table lamp", 594), ("desk lamp", 594),
    ("floor lamp", 594), ("bedside lamp", 594), ("reading lamp", 594),
    ("light", 594), ("lights", 594), ("lighting", 594),
    ("chandelier", 594), ("pendant light", 594), ("ceiling light", 594),
    // 時計
    ("clock", 3890), ("clocks", 3890), ("wall clock", 3890), ("table clock", 3890),
    ("desk clock", 3890), ("alarm clock", 3890), ("mantle clock", 3890),
    // 素材
    ("ceramic", 3553), ("porcelain", 3553), ("stoneware", 3553), ("earthenware", 3553),
    ("bone china", 3553), ("fine china", 3553), ("china", 3553),
    ("crystal", 674), ("lead crystal", 674), ("cut glass", 674),
    ("bamboo", 3553), ("wood", 3553), ("wooden", 3553), ("teak", 3553),
    ("melamine", 3553), ("plastic", 674), ("acrylic", 674),
    ("stainless steel", 3939), ("metal", 3939), ("aluminum", 3939), ("copper", 3939),
    ("brass", 3939), ("silver", 3939), ("gold", 3939),
    // 用途・スタイル
    ("serving", 4009), ("decorative", 602), ("ornamental", 602), ("accent", 602),
    ("statement", 602), ("centerpiece", 602), ("display", 602),
    ("handmade", 602), ("artisan", 602), ("handcrafted", 602), ("artistic", 602),
    ("vintage", 602), ("antique", 602), ("retro", 602), ("classic", 3553),
    ("modern", 3553), ("contemporary", 3553), ("minimalist", 3553), ("elegant", 3553),
    // 数量・サイズ
    ("set", 3553), ("collection", 3553), ("series", 3553), ("range", 3553),
    ("pair", 3553), ("duo", 3553), ("individual", 6049), ("single", 6049),
    ("mini", 6049), ("small", 6049), ("large", 4009), ("jumbo", 4009),
    ("family", 4009), ("party", 4009), ("entertaining", 4009),
    // 部屋・利用シーン
    ("kitchen", 3553), ("dining", 3553), ("tableware", 3553), ("dinnerware", 3553),
    ("serveware", 4009), ("drinkware", 674), ("cookware", 662), ("bakeware", 641),
    ("bedroom", 602), ("living room", 602), ("bathroom", 2915), ("office", 3367),
    ("study", 3367), ("home", 602), ("garden", 602), ("outdoor", 4009),
];

const DESCRIPTION_KEYWORDS: &[(&str, u64)] = &[
    // 香水の説明
    ("long lasting", 2915), ("long-lasting", 2915), ("all day", 2915),
    ("oriental scent", 2915), ("floral notes", 2915), ("woody notes", 2915),
    ("citrus notes", 2915), ("musky", 2915), ("fresh scent", 2915),
    ("luxury fragrance", 2915), ("premium perfume", 2915),
    ("arabic scent", 2915), ("middle eastern", 2915),
    ("spray bottle", 2915), ("atomizer", 2915), ("perfume bottle", 2915),
    // インテリアの説明
    ("wall hanging", 500044), ("hang on wall", 500044), ("wall mounted", 500044),
    ("living room decor", 602), ("bedroom decor", 602), ("home decoration", 602),
    ("decorative piece", 602), ("accent piece", 602), ("conversation starter", 602),
    ("centerpiece", 602), ("focal point", 602), ("eye catching", 602),
    // フォトフレームの説明
    ("holds photo", 3367), ("picture display", 3367), ("photo display", 3367),
    ("memory keeper", 3367), ("cherished moments", 3367), ("family photo", 3367),
    ("wedding photo", 3367), ("graduation photo", 3367),
    // 照明の説明
    ("provides light", 594), ("illumination", 594), ("ambient lighting", 594),
    ("mood lighting", 594), ("task lighting", 594), ("warm glow", 594),
    ("bright light", 594), ("soft light", 594), ("dimmer", 594),
    // 使用シーン
    ("dining experience", 3553), ("meal time", 3553), ("dinner party", 3553),
    ("special occasion", 3553), ("everyday use", 3553), ("family dinner", 3553),
    ("entertaining guests", 4009), ("hosting", 4009), ("serve food", 4009),
    ("serve drinks", 674), ("beverage service", 674), ("drink serving", 674),
    // 機能
    ("dishwasher safe", 3553), ("microwave safe", 3553), ("oven safe", 641),
    ("food grade", 674), ("bpa free", 674), ("leak proof", 674),
    ("easy to clean", 3553), ("non slip", 4009), ("stackable", 3553),
    // 仕上げ
    ("handcrafted", 602), ("artisan made", 602), ("hand painted", 602),
    ("glazed finish", 3553), ("matte finish", 602), ("glossy finish", 674),
    ("textured surface", 602), ("smooth surface", 674),
    // 容量
    ("holds 8 ounces", 674), ("holds 12 ounces", 2169), ("holds 16 ounces", 2951),
    ("family size", 4009), ("individual portion", 6049), ("single serving", 6049),
    ("large capacity", 4009), ("compact size", 6049),
];

const FALLBACK_PATTERNS: &[(&str, u64, f64)] = &[
    // 素材
    ("glass", 674, 18.0),
    ("ceramic", 3553, 18.0),
    ("porcelain", 3553, 18.0),
    ("crystal", 674, 18.0),
    ("wood", 602, 16.0),
    ("metal", 3939, 16.0),
    // 用途
    ("decorative", 602, 16.0),
    ("serving", 4009, 16.0),
    ("storage", 574, 16.0),
    ("display", 3367, 16.0),
    // 部屋
    ("kitchen", 3553, 14.0),
    ("dining", 3553, 14.0),
    ("bedroom", 602, 14.0),
    ("bathroom", 2915, 14.0),
    ("living room", 602, 14.0),
    // セット
    ("set", 3553, 14.0),
    ("collection", 3553, 14.0),
];

const CATEGORY_NAMES: &[(u64, &str)] = &[
    (574, "Home & Garden > Decor > Baskets"),
    (583, "Home & Garden > Decor > Mirrors"),
    (588, "Home & Garden > Decor > Home Fragrances > Candles"),
    (594, "Home & Garden > Lighting > Lamps"),
    (602, "Home & Garden > Decor > Vases"),
    (641, "Home & Garden > Kitchen & Dining > Cookware & Bakeware > Bakeware > Baking & Cookie Sheets"),
    (662, "Home & Garden > Kitchen & Dining > Cookware & Bakeware > Cookware > Skillets & Frying Pans"),
    (663, "Home & Garden > Kitchen & Dining > Cookware & Bakeware > Cookware > Stock Pots"),
    (674, "Home & Garden > Kitchen & Dining > Tableware > Drinkware"),
    (1985, "Home & Garden > Kitchen & Dining > Table Linens"),
    (2169, "Home & Garden > Kitchen & Dining > Tableware > Drinkware > Mugs"),
    (2784, "Home & Garden > Decor > Home Fragrance Accessories > Candle Holders"),
    (2915, "Health & Beauty > Personal Care > Cosmetics > Fragrance"),
    (2951, "Home & Garden > Kitchen & Dining > Tableware > Drinkware > Tumblers"),
    (3330, "Home & Garden > Kitchen & Dining > Tableware > Serveware > Serving Pitchers & Carafes"),
    (3367, "Home & Garden > Decor > Picture Frames"),
    (3498, "Home & Garden > Kitchen & Dining > Tableware > Dinnerware > Bowls"),
    (3553, "Home & Garden > Kitchen & Dining > Tableware > Dinnerware > Plates"),
    (3844, "Home & Garden > Kitchen & Dining > Tableware > Flatware > Table Knives"),
    (3890, "Home & Garden > Decor > Clocks"),
    (3939, "Home & Garden > Kitchen & Dining > Tableware > Flatware > Spoons"),
    (4009, "Home & Garden > Kitchen & Dining > Tableware > Serveware > Serving Trays"),
    (4015, "Home & Garden > Kitchen & Dining > Tableware > Flatware > Forks"),
    (6049, "Home & Garden > Kitchen & Dining > Tableware > Drinkware > Coffee & Tea Cups"),
    (6456, "Home & Garden > Decor > Decorative Trays"),
    (500044, "Home & Garden > Decor > Artwork"),
];

fn pairs(table: &[(&str, u64)]) -> Vec<(String, CategoryId)> {
    table
        .iter()
        .map(|&(phrase, id)| (phrase.to_string(), CategoryId(id)))
        .collect()
}

fn context_group(categories: &[u64], terms: &[&str], weight: f64) -> ContextGroup {
    ContextGroup {
        categories: categories.iter().map(|&id| CategoryId(id)).collect(),
        terms: terms.iter().map(|t| t.to_string()).collect(),
        weight,
    }
}

impl KeywordDictionary {
    /// 組み込みプリセット
    pub fn builtin() -> Self {
        Self {
            keywords: pairs(KEYWORDS),
            description_keywords: pairs(DESCRIPTION_KEYWORDS),
            brand_defaults: Vec::new(),
            fallback_patterns: FALLBACK_PATTERNS
                .iter()
                .map(|&(pattern, id, score)| FallbackPattern {
                    pattern: pattern.to_string(),
                    category: CategoryId(id),
                    score,
                })
                .collect(),
            context_groups: vec![
                context_group(
                    &[2915],
                    &["scent", "smell", "aroma", "fragrant", "perfumed", "aromatic",
                      "spray", "bottle", "ml", "fluid", "liquid", "essential", "oil"],
                    3.0,
                ),
                context_group(
                    &[3367],
                    &["photo", "picture", "image", "display", "wall", "desk",
                      "memory", "family", "wedding", "graduation"],
                    3.0,
                ),
                context_group(
                    &[594],
                    &["bulb", "watt", "bright", "dim", "glow", "illumination",
                      "switch", "shade", "cord", "plug"],
                    3.0,
                ),
                context_group(
                    &[3553, 3498, 674, 2169],
                    &["kitchen", "dining", "meal", "food", "eat", "drink",
                      "dishwasher", "microwave", "table", "dinner"],
                    2.0,
                ),
            ],
            category_names: CATEGORY_NAMES
                .iter()
                .map(|&(id, name)| (CategoryId(id), name.to_string()))
                .collect(),
            context_cap: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_compiles() {
        let compiled = KeywordDictionary::builtin().compile().unwrap();
        assert!(compiled.rules.len() > 300);
        assert_eq!(compiled.fallback_patterns[0].pattern, "glass");
    }

    #[test]
    fn test_builtin_shared_phrases_are_description_specific() {
        let compiled = KeywordDictionary::builtin().compile().unwrap();
        for phrase in ["handcrafted", "accent piece", "centerpiece"] {
            let rule = compiled.rules.iter().find(|r| r.phrase == phrase).unwrap();
            assert!(rule.description_specific, "{} should be description-specific", phrase);
            assert_eq!(rule.category, CategoryId(602));
        }
    }

    #[test]
    fn test_builtin_category_names() {
        let compiled = KeywordDictionary::builtin().compile().unwrap();
        assert_eq!(
            compiled.category_name(CategoryId(3367)),
            Some("Home & Garden > Decor > Picture Frames")
        );
    }
}
