use std::sync::LazyLock;

use ahash::AHashMap;

const YAKU_NAMES: &[(&str, &str)] = &[
    ("赤ドラ", "Red Five"),
    ("立直", "Riichi"),
    ("ドラ", "Dora"),
    ("断幺九", "Tanyao"),
    ("平和", "Pinfu"),
    ("門前清自摸和", "Menzen Tsumo"),
    ("裏ドラ", "Ura Dora"),
    ("一発", "Ippatsu"),
    ("役牌:場風牌", "Yakuhai (Round Wind)"),
    ("役牌:自風牌", "Yakuhai (Seat Wind)"),
    ("役牌 發", "Yakuhai (Green Dragon)"),
    ("役牌 白", "Yakuhai (White Dragon)"),
    ("役牌 中", "Yakuhai (Red Dragon)"),
    ("混一色", "Honitsu"),
    ("一盃口", "Iipeikou"),
    ("三色同順", "Sanshoku Doujun"),
    ("対々和", "Toitoi"),
    ("七対子", "Chiitoitsu"),
    ("一気通貫", "Ittsu"),
    ("混全帯幺九", "Chanta"),
    ("清一色", "Chinitsu"),
    ("三暗刻", "Sanankou"),
    ("河底撈魚", "Houtei Raoyui"),
    ("純全帯幺九", "Junchan"),
    ("海底摸月", "Haitei Raoyue"),
    ("嶺上開花", "Rinshan Kaihou"),
    ("ダブル立直", "Double Riichi"),
    ("小三元", "Shousangen"),
    ("槍槓", "Chankan"),
    ("混老頭", "Honroutou"),
    ("三色同刻", "Sanshoku Doukou"),
    ("二盃口", "Ryanpeikou"),
    ("四暗刻", "Suuankou"),
    ("大三元", "Daisangen"),
    ("国士無双", "Kokushi Musou"),
    ("小四喜", "Shousuushii"),
    ("字一色", "Tsuuiisou"),
    ("四暗刻単騎", "Suuankou Tanki"),
    ("三槓子", "Sankantsu"),
    ("清老頭", "Chinroutou"),
    ("天和", "Tenhou"),
    ("地和", "Chiihou"),
    ("緑一色", "Ryuuiisou"),
    ("国士無双１３面", "Kokushi Musou 13-sided Wait"),
    ("大四喜", "Daisuushii"),
    ("四槓子", "Suukantsu"),
    ("九蓮宝燈", "Chuuren Poutou"),
    ("純正九蓮宝燈", "Junsei Chuuren Poutou"),
];

static YAKU_NAMES_MAP: LazyLock<AHashMap<&'static str, &'static str>> =
    LazyLock::new(|| YAKU_NAMES.iter().copied().collect());

/// Display name for a yaku as written in tenhou logs. Names not in the
/// table, including ones already in English, pass through unchanged.
#[must_use]
pub fn display_name(name: &str) -> String {
    YAKU_NAMES_MAP.get(name).copied().unwrap_or(name).to_owned()
}
