use std::collections::BTreeMap;

use crate::portrait::types::{FashionSlot, OptionItem, ScenarioPreset, StyleCategory};

const CLASSICAL_STYLES: &[(&str, &str)] = &[
    ("xionghun", "Classical Chinese 'XiongHun' (雄浑). Grand, vigorous, powerful, sublime nature, strong presence, epic lighting."),
    ("chongdan", "Classical Chinese 'ChongDan' (冲淡). Serene, mild, light, simple, tranquil, minimalist, zen-like, soft natural lighting."),
    ("dianya", "Classical Chinese 'DianYa' (典雅). Classic elegance, graceful, proper, refined, tasteful, aristocratic but understated."),
    ("xiannong", "Classical Chinese 'XianNong' (纤秾). Delicate, rich, colorful, lush, detailed texture, exquisite beauty."),
    ("xilian", "Classical Chinese 'XiLian' (洗炼). Polished, concise, crystalline, sharp, clean-cut, essence-focused."),
    ("jingjian", "Classical Chinese 'JingJian' (劲健). Sturdy, robust, healthy, energetic, athletic, firm."),
    ("qili", "Classical Chinese 'QiLi' (绮丽). Beautiful, gorgeous, magnificent, ornate, glowing."),
    ("ziran", "Classical Chinese 'ZiRan' (自然). Natural, spontaneous, unforced, fresh, organic."),
    ("hanxu", "Classical Chinese 'HanXu' (含蓄). Implicit, reserved, subtle, deep, mysterious, suggestive."),
    ("haofang", "Classical Chinese 'HaoFang' (豪放). Unconstrained, bold, open, free-spirited, heroic."),
    ("chenzhuo", "Classical Chinese 'ChenZhuo' (沉着). Deep, composed, steady, calm, profound, heavy texture, stable composition."),
    ("gaogu", "Classical Chinese 'GaoGu' (高古). Lofty, ancient, timeless, detached, spiritual, archaic aesthetic."),
    ("jingshen", "Classical Chinese 'JingShen' (精神). Spirited, vital, sharp, bright, clear, full of life force."),
    ("zhenmi", "Classical Chinese 'ZhenMi' (缜密). Dense, detailed, meticulous, intricate, fine craftsmanship."),
    ("shuye", "Classical Chinese 'ShuYe' (疏野). Unrestrained, wild, rustic, open, rough but charming, untamed beauty."),
    ("qingqi", "Classical Chinese 'QingQi' (清奇). Clear and unusual, strange but pure, unique structure, crisp."),
    ("weiqu", "Classical Chinese 'WeiQu' (委曲). Winding, subtle, indirect, intricate curves, soft transitions."),
    ("shijing", "Classical Chinese 'ShiJing' (实境). Concrete, real, tangible, photorealistic, grounded."),
    ("beikai", "Classical Chinese 'BeiKai' (悲慨). Tragic, generous, emotional, melancholic but grand, dramatic lighting."),
    ("xingrong", "Classical Chinese 'XingRong' (形容). Form-focused, descriptive, capturing the exact shape and essence."),
    ("chaoyi", "Classical Chinese 'ChaoYi' (超诣). Transcendent, beyond the mundane, ethereal, spiritual high ground."),
    ("piaoyi", "Classical Chinese 'PiaoYi' (飘逸). Drifting, elegant, flying, weightless, fairy-like, ethereal movement."),
    ("kuangda", "Classical Chinese 'KuangDa' (旷达). Broad-minded, open, vast, unrestricted, optimistic."),
    ("liudong", "Classical Chinese 'LiuDong' (流动). Flowing, dynamic, rhythmic, moving, liquid-like."),
];

const MOOD_STYLES: &[(&str, &str)] = &[
    ("less_tired", "Look Less Tired. Refresh, energetic eyes, reduce dark circles, lifted brow, awake appearance."),
    ("younger", "Look Younger. Firm skin, voluminous cheeks, reduced nasolabial folds, collagen-rich look."),
    ("attractive", "Look More Attractive. Enhanced Golden Ratio, magnetic eyes, perfect proportions, increased facial harmony."),
    ("slimmer", "Look Slimmer. Contoured jawline, defined cheekbones, reduced facial volume, V-shape face."),
    ("qingleng", "High-cold, aloof, cool tone, distant but attractive, 'QingLeng' vibe, icy beauty."),
    ("posui", "Fragile beauty, emotional, vulnerable, 'PoSuiGan', glass-like delicacy."),
    ("songchi", "Relaxed, effortless chic, comfortable, 'SongChiGan', unbothered elegance."),
    ("zhixing", "Sapiosexual vibe, intelligent, sharp, academic, 'ZhiXingLian', glasses, smart look."),
    ("sweet", "Sweet, innocent, sugary, 'TianMei', round eyes, soft smile."),
    ("melancholy", "Melancholic, deep, artistic sadness, 'YouYu', poetic mood."),
];

const STATUS_STYLES: &[(&str, &str)] = &[
    ("confident", "State: Confident. Direct gaze, strong chin, posture, assertive lighting, sharp focus."),
    ("trustworthy", "State: Trustworthy. Soft eyes, genuine micro-smile, open expression, warm lighting, reliable vibe."),
    ("executive", "State: Executive/Presidential. Powerful, commanded, composed, expensive look, premium quality."),
    ("mingyuan", "Socialite vibe, expensive, polished, 'MingYuan' style, luxury atmosphere."),
    ("shujuan", "Bookish, scholarly, gentle, intellectual, 'ShuJuanQi', quiet library vibe."),
    ("artist", "Artistic, creative, unconventional, expressive, 'YiShuJia', gallery lighting."),
    ("protagonist", "Main character energy, spotlight, glowing, 'ZhuJueGuangHuan', cinematic center."),
    ("energetic", "State: Energetic. Dynamic, bright, healthy glow, vitality, sparkling eyes."),
    ("reliable", "State: Reliable. Solid, grounded, dependable, warm earth tones."),
    ("wealthy", "State: Old Money. Understated luxury, cashmere textures, quiet confidence, 'LaoQianFeng'."),
];

const TWEAK_STYLES: &[(&str, &str)] = &[
    ("big_eyes", "Feature Tweak: Enlarged Eyes. Doe eyes, bambi eyes, open and bright."),
    ("high_nose", "Feature Tweak: High Nose Bridge. Refined nasal tip, tall bridge, sculpted nose."),
    ("small_face", "Feature Tweak: Small Face. Compact facial features, petite bone structure."),
    ("m_lips", "Feature Tweak: M-shaped Lips. Defined cupid's bow, plump vermilion border."),
    ("elf_ear", "Feature Tweak: Elf Ears. Slightly protruding upper ears, face appears smaller, fantasy touch."),
    ("wild_brows", "Feature Tweak: Wild Brows. Natural, feathery, textured eyebrows, defined hair strokes."),
    ("high_cranial", "Feature Tweak: High Cranial Top. Voluminous hair root, high skull top 'GaoLuDing'."),
    ("shoulder", "Feature Tweak: Right-angled Shoulder. Defined clavicle, straight shoulder line, elegant posture."),
    ("plump", "Feature Tweak: Plump/Youthful. Baby fat, rounded features, cute and youthful."),
    ("sharp_jaw", "Feature Tweak: Razor sharp jawline, defined angles, model look."),
];

const FASHION_ITEMS: &[(&str, &str)] = &[
    ("h_straight", "Hairstyle: Sleek, silky long straight black hair, high shine."),
    ("h_wavy", "Hairstyle: Voluminous romantic wavy hair, big curls, glamorous."),
    ("h_french", "Hairstyle: French chic messy bun, effortless, wispy bangs."),
    ("h_bob", "Hairstyle: Sharp precision bob cut, modern, edgy."),
    ("h_ponytail", "Hairstyle: High sleek ponytail, snatched look."),
    ("h_wool", "Hairstyle: Wool roll curls, retro cute, textured volume."),
    ("h_clavicle", "Hairstyle: Clavicle length hair, airy and light, layered."),
    ("h_hime", "Hairstyle: Hime cut (Princess cut), blunt sidelocks, anime aesthetic."),
    ("h_wolf", "Hairstyle: Wolf cut, layers, texture, trendy shaggy look."),
    ("h_updo", "Hairstyle: Elegant formal updo, clean neck."),
    ("hw_tiara", "Headwear: Delicate diamond tiara, princess vibe."),
    ("hw_ribbon", "Headwear: Silk ribbon bow, chanel style black or white."),
    ("hw_beret", "Headwear: Wool beret, artist vibe, chic."),
    ("hw_veil", "Headwear: Sheer lace veil, mysterious, bridal aesthetic."),
    ("hw_hairpin", "Headwear: Traditional jade hairpin (Zan), oriental classical vibe."),
    ("hw_crown", "Headwear: Gold crown, regal, queen aesthetic."),
    ("hw_flower", "Headwear: Fresh flower tucked behind ear, nature vibe."),
    ("hw_band", "Headwear: Wide velvet headband, retro aesthetic."),
    ("hw_turban", "Headwear: Silk turban, exotic, high fashion."),
    ("hw_cap", "Headwear: Baseball cap, street style, casual."),
    ("e_studs", "Earrings: Simple diamond studs, minimalist class."),
    ("e_pearl", "Earrings: Classic pearl earrings, elegant."),
    ("e_hoops", "Earrings: Large gold hoop earrings, bold statement."),
    ("e_tassel", "Earrings: Long diamond tassel earrings, evening wear."),
    ("e_vintage", "Earrings: Vintage gold clip-ons, matte finish."),
    ("e_jade", "Earrings: Green jade drops, oriental elegance."),
    ("e_cuff", "Earrings: Modern ear cuffs, edgy, silver."),
    ("e_chandelier", "Earrings: Crystal chandelier earrings, elaborate."),
    ("e_geometric", "Earrings: Geometric gold shapes, modern art vibe."),
    ("e_flower", "Earrings: Floral motif earrings, delicate, feminine."),
    ("n_choker", "Necklace: Black velvet choker with cameo."),
    ("n_pearl", "Necklace: Single strand pearl necklace, old money aesthetic."),
    ("n_diamond", "Necklace: Fine diamond tennis necklace, sparkle."),
    ("n_gold", "Necklace: Thin gold chain, minimalist."),
    ("n_pendant", "Necklace: Statement emerald pendant."),
    ("n_layered", "Necklace: Layered gold chains, bohemian."),
    ("n_collar", "Necklace: Metal collar necklace, futuristic."),
    ("n_locket", "Necklace: Vintage locket, sentimental."),
    ("c_gown", "Clothing: Haute couture evening gown, silk, expensive fabric."),
    ("c_suit", "Clothing: Sharp tailored white blazer, power suit, executive look."),
    ("c_qipao", "Clothing: Modernized Qipao (Cheongsam), silk, oriental patterns."),
    ("c_shirt", "Clothing: Crisp white oversized shirt, clean aesthetic."),
    ("c_turtleneck", "Clothing: Black turtleneck, jobs-core, intellectual."),
    ("c_offshoulder", "Clothing: Off-shoulder top, highlighting clavicles."),
    ("c_tweed", "Clothing: Chanel-style tweed jacket, classic old money."),
    ("c_newchinese", "Clothing: New Chinese style, modern cut with traditional elements."),
    ("c_slip", "Clothing: Silk slip dress, minimal, sultry."),
    ("c_leather", "Clothing: Black leather jacket, cool, edgy."),
    ("o_trench", "Outerwear: Camel trench coat, belted, timeless."),
    ("o_cashmere", "Outerwear: Long cashmere overcoat, soft drape, quiet luxury."),
    ("o_fur", "Outerwear: Faux fur stole over the shoulders, glamorous."),
    ("o_cape", "Outerwear: Structured silk cape, dramatic silhouette."),
    ("o_denim", "Outerwear: Oversized vintage denim jacket, casual."),
    ("f_heels", "Footwear: Pointed black stiletto heels, elegant."),
    ("f_loafers", "Footwear: Polished leather loafers, preppy."),
    ("f_boots", "Footwear: Knee-high leather boots, sleek."),
    ("f_sneakers", "Footwear: Clean white sneakers, minimal street style."),
    ("a_glasses", "Accessories: Thin gold-rimmed glasses, intellectual."),
    ("a_sunglasses", "Accessories: Oversized tortoiseshell sunglasses pushed up on the head."),
    ("a_scarf", "Accessories: Silk twilly scarf tied at the neck, Parisian."),
    ("a_watch", "Accessories: Slim luxury wristwatch, understated."),
    ("a_gloves", "Accessories: Long satin opera gloves, vintage glamour."),
];

const LIGHTING: &[(&str, &str)] = &[
    ("studio", "Lighting: Professional Studio Lighting. Softbox, Rembrandt lighting, perfectly balanced."),
    ("natural", "Lighting: Natural Daylight. Soft, diffused, window light, golden hour."),
    ("cinematic", "Lighting: Cinematic Lighting. Dramatic shadows, teal and orange, moody atmosphere."),
    ("warm", "Lighting: Warm Tungsten. Cozy, inviting, candle-light vibe."),
];

const ENVIRONMENTS: &[(&str, &str)] = &[
    ("solid", "Background: Solid Color. Clean, minimal, matte finish."),
    ("indoor", "Background: Luxury Interior. Blurred background of a high-end apartment or hotel."),
    ("outdoor", "Background: Nature/City. Blurred background of a garden or cityscape."),
    ("artistic", "Background: Abstract Art. Textured canvas background, artistic brushstrokes."),
];

pub const DEFAULT_LIGHTING: &str = "studio";
pub const DEFAULT_ENVIRONMENT: &str = "solid";

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(id, _)| *id == key)
        .map(|(_, text)| *text)
}

fn style_table(category: StyleCategory) -> &'static [(&'static str, &'static str)] {
    match category {
        StyleCategory::Clinical => &[],
        StyleCategory::Classical => CLASSICAL_STYLES,
        StyleCategory::Mood => MOOD_STYLES,
        StyleCategory::Status => STATUS_STYLES,
        StyleCategory::Tweak => TWEAK_STYLES,
    }
}

/// Clinical has no lexicon, so it never resolves a sub option.
pub fn style_entry(category: StyleCategory, sub_option: &str) -> Option<&'static str> {
    lookup(style_table(category), sub_option)
}

pub fn fashion_entry(option_id: &str) -> Option<&'static str> {
    lookup(FASHION_ITEMS, option_id)
}

pub fn lighting_entry(key: &str) -> Option<&'static str> {
    lookup(LIGHTING, key)
}

pub fn environment_entry(key: &str) -> Option<&'static str> {
    lookup(ENVIRONMENTS, key)
}

pub fn lighting_keys() -> impl Iterator<Item = &'static str> {
    LIGHTING.iter().map(|(id, _)| *id)
}

pub fn environment_keys() -> impl Iterator<Item = &'static str> {
    ENVIRONMENTS.iter().map(|(id, _)| *id)
}

fn options(entries: &[(&str, &str, &str)]) -> Vec<OptionItem> {
    entries
        .iter()
        .map(|(id, label, tip)| OptionItem::new(id, label, tip))
        .collect()
}

pub fn default_style_options() -> BTreeMap<StyleCategory, Vec<OptionItem>> {
    let mut map = BTreeMap::new();
    map.insert(
        StyleCategory::Classical,
        options(&[
            ("xionghun", "雄浑", "气象雄伟，浑然一体"),
            ("chongdan", "冲淡", "淡泊宁静，气质清雅"),
            ("dianya", "典雅", "端庄高雅，贵族气质"),
            ("xiannong", "纤秾", "色彩鲜艳，富丽精致"),
            ("xilian", "洗炼", "简洁利落，去粗取精"),
            ("jingjian", "劲健", "健康有力，充满活力"),
            ("qili", "绮丽", "华丽光彩，明艳动人"),
            ("ziran", "自然", "清新脱俗，毫无矫饰"),
            ("hanxu", "含蓄", "意在言外，深沉内敛"),
            ("haofang", "豪放", "气度非凡，洒脱大气"),
            ("chenzhuo", "沉着", "深沉稳重，不露锋芒"),
            ("gaogu", "高古", "古朴高远，超凡脱俗"),
            ("qingqi", "清奇", "清秀奇特，风格独特"),
            ("weiqu", "委曲", "婉转含蓄，曲折幽深"),
            ("shijing", "实境", "真实自然，不尚空灵"),
            ("beikai", "悲慨", "慷慨悲歌，气势苍凉"),
            ("xingrong", "形容", "描绘细腻，形神兼备"),
            ("chaoyi", "超诣", "超凡脱俗，境界高远"),
            ("piaoyi", "飘逸", "飘逸若仙，灵动自由"),
            ("kuangda", "旷达", "心胸开阔，豁达大度"),
            ("liudong", "流动", "气韵生动，如行云流水"),
        ]),
    );
    map.insert(
        StyleCategory::Mood,
        options(&[
            ("less_tired", "元气感", "消除疲惫，提升精气神"),
            ("younger", "幼态感", "面部饱满，增加少女感"),
            ("attractive", "吸引力", "增强第一眼惊艳感"),
            ("slimmer", "瘦脸感", "收紧轮廓，视觉显瘦"),
            ("qingleng", "清冷感", "高冷疏离，气质独特"),
            ("posui", "破碎感", "脆弱惹人怜爱"),
            ("songchi", "松弛感", "毫不费力的时髦"),
            ("zhixing", "智性恋", "高智商精英气质"),
            ("sweet", "甜美感", "笑容甜美，亲和力强"),
            ("melancholy", "忧郁感", "文艺忧郁，故事感"),
        ]),
    );
    map.insert(
        StyleCategory::Status,
        options(&[
            ("confident", "自信", "气场全开，眼神坚定"),
            ("trustworthy", "信赖感", "真诚可靠，面部柔和"),
            ("executive", "总裁感", "智性审美，精英气质"),
            ("mingyuan", "名媛感", "精致贵气，生活优渥"),
            ("shujuan", "书卷气", "温润如玉，知性儒雅"),
            ("artist", "艺术家", "独特个性，不落俗套"),
            ("protagonist", "主角光环", "吸睛夺目，C位气场"),
            ("energetic", "活力", "元气满满"),
            ("reliable", "稳重", "踏实可靠，值得托付"),
            ("wealthy", "老钱风", "低调奢华，底蕴深厚"),
        ]),
    );
    map.insert(
        StyleCategory::Tweak,
        options(&[
            ("big_eyes", "大眼", "适度放大双眼"),
            ("high_nose", "高鼻", "垫高鼻梁，缩小鼻翼"),
            ("small_face", "小脸", "整体缩小面部轮廓"),
            ("m_lips", "M唇", "立体唇峰，精致唇形"),
            ("elf_ear", "精灵耳", "显脸小，增加灵动感"),
            ("wild_brows", "野生眉", "自然毛流感"),
            ("high_cranial", "高颅顶", "头包脸，显脸小"),
            ("shoulder", "直角肩", "优美肩颈线条"),
            ("plump", "幼态饱满", "面部填充感，胶原蛋白"),
            ("sharp_jaw", "下颌折角", "清晰利落的下颌线"),
        ]),
    );
    map
}

pub fn default_fashion_options() -> BTreeMap<FashionSlot, Vec<OptionItem>> {
    let mut map = BTreeMap::new();
    map.insert(
        FashionSlot::Hairstyle,
        options(&[
            ("h_straight", "黑长直", "清纯女神范"),
            ("h_wavy", "大波浪", "妩媚动人"),
            ("h_french", "法式盘发", "慵懒优雅"),
            ("h_bob", "一刀切", "干练酷飒"),
            ("h_ponytail", "高马尾", "活力减龄"),
            ("h_wool", "羊毛卷", "复古可爱"),
            ("h_clavicle", "锁骨发", "温柔知性"),
            ("h_hime", "公主切", "二次元撕漫感"),
            ("h_wolf", "鲻鱼头", "中性帅气"),
            ("h_updo", "晚宴盘发", "端庄正式"),
        ]),
    );
    map.insert(
        FashionSlot::Headwear,
        options(&[
            ("hw_tiara", "钻石冠冕", "女王气场"),
            ("hw_ribbon", "丝绸发带", "法式少女"),
            ("hw_beret", "贝雷帽", "文艺画家"),
            ("hw_veil", "蕾丝面纱", "神秘朦胧"),
            ("hw_hairpin", "玉簪", "古典温婉"),
            ("hw_flower", "鲜花", "森系自然"),
            ("hw_band", "宽发箍", "复古名伶"),
            ("hw_turban", "丝巾", "异域风情"),
            ("hw_cap", "棒球帽", "休闲街头"),
        ]),
    );
    map.insert(
        FashionSlot::Earrings,
        options(&[
            ("e_studs", "钻石耳钉", "简约闪耀"),
            ("e_pearl", "珍珠", "圆润典雅"),
            ("e_hoops", "圆环", "欧美大气"),
            ("e_tassel", "流苏", "修饰脸型"),
            ("e_vintage", "复古金", "做旧质感"),
            ("e_jade", "翡翠", "东方韵味"),
            ("e_cuff", "耳骨夹", "酷感十足"),
            ("e_chandelier", "水晶吊灯", "奢华晚宴"),
            ("e_geometric", "几何金饰", "现代艺术"),
            ("e_flower", "花朵", "清新柔美"),
        ]),
    );
    map.insert(
        FashionSlot::Necklace,
        options(&[
            ("n_choker", "Choker", "修饰颈部"),
            ("n_pearl", "珍珠项链", "优雅传承"),
            ("n_diamond", "钻石项链", "璀璨夺目"),
            ("n_gold", "细金链", "精致锁骨"),
            ("n_pendant", "宝石吊坠", "视觉焦点"),
            ("n_layered", "叠戴项链", "层次丰富"),
            ("n_collar", "金属项圈", "未来感"),
            ("n_locket", "相盒", "复古情怀"),
        ]),
    );
    map.insert(
        FashionSlot::Clothing,
        options(&[
            ("c_gown", "礼服", "高定奢华"),
            ("c_suit", "白西装", "职场大女主"),
            ("c_qipao", "旗袍", "婀娜多姿"),
            ("c_shirt", "白衬衫", "纯欲天花板"),
            ("c_turtleneck", "黑高领", "乔布斯式极简"),
            ("c_offshoulder", "一字肩", "展露锁骨"),
            ("c_tweed", "小香风", "经典优雅"),
            ("c_newchinese", "新中式", "东方美学"),
            ("c_slip", "吊带裙", "性感慵懒"),
            ("c_leather", "皮衣", "机车酷感"),
        ]),
    );
    map.insert(
        FashionSlot::Outerwear,
        options(&[
            ("o_trench", "风衣", "经典利落"),
            ("o_cashmere", "羊绒大衣", "低调奢华"),
            ("o_fur", "皮草披肩", "复古华丽"),
            ("o_cape", "斗篷", "戏剧张力"),
            ("o_denim", "牛仔外套", "随性休闲"),
        ]),
    );
    map.insert(
        FashionSlot::Footwear,
        options(&[
            ("f_heels", "尖头高跟", "优雅气场"),
            ("f_loafers", "乐福鞋", "学院风"),
            ("f_boots", "长靴", "利落修长"),
            ("f_sneakers", "小白鞋", "干净清爽"),
        ]),
    );
    map.insert(
        FashionSlot::Accessories,
        options(&[
            ("a_glasses", "金丝眼镜", "斯文知性"),
            ("a_sunglasses", "墨镜", "明星气场"),
            ("a_scarf", "丝巾", "法式优雅"),
            ("a_watch", "腕表", "低调品味"),
            ("a_gloves", "长手套", "复古名伶"),
        ]),
    );
    map
}

pub fn default_scenario_presets() -> Vec<ScenarioPreset> {
    [
        ("boss", "职场大女主", "干练、自信、总裁感"),
        ("princess", "在逃公主", "甜美、高贵、钻石冠冕"),
        ("scholar", "清冷学姐", "智性、书卷气、黑长直"),
        ("retro", "复古名伶", "港风、明艳、大波浪"),
        ("fairy", "森系精灵", "自然、灵动、鲜花点缀"),
        ("cybergirl", "赛博少女", "酷飒、未来感、几何配饰"),
    ]
    .into_iter()
    .map(|(id, name, description)| ScenarioPreset {
        id: id.to_string(),
        name: name.to_string(),
        icon: String::new(),
        description: description.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clinical_never_resolves_from_the_lexicon() {
        assert_eq!(style_entry(StyleCategory::Clinical, "standard"), None);
        assert_eq!(style_entry(StyleCategory::Clinical, "xionghun"), None);
    }

    #[test]
    fn style_lookup_is_scoped_to_its_category() {
        assert!(style_entry(StyleCategory::Classical, "xionghun").is_some());
        assert_eq!(style_entry(StyleCategory::Mood, "xionghun"), None);
    }

    #[test]
    fn every_display_option_has_a_lexicon_entry() {
        for (category, items) in default_style_options() {
            for item in items {
                assert!(
                    style_entry(category, &item.id).is_some(),
                    "{category}/{} missing",
                    item.id
                );
            }
        }
        for (slot, items) in default_fashion_options() {
            for item in items {
                assert!(fashion_entry(&item.id).is_some(), "{slot}/{} missing", item.id);
            }
        }
    }

    #[test]
    fn every_fashion_slot_offers_options() {
        let options = default_fashion_options();
        for slot in FashionSlot::ALL {
            assert!(options.get(&slot).is_some_and(|items| !items.is_empty()));
        }
    }

    #[test]
    fn background_baselines_resolve() {
        assert!(lighting_entry(DEFAULT_LIGHTING).is_some());
        assert!(environment_entry(DEFAULT_ENVIRONMENT).is_some());
        assert_eq!(lighting_entry("disco"), None);
    }
}
