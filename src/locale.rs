use std::str::FromStr;

/// Language used for exported headers, sheet names and default labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Chinese,
    English,
}

/// Every user-facing string that ends up inside stored or exported data.
#[derive(Debug)]
pub struct Labels {
    pub group_header: &'static str,
    pub name_header: &'static str,
    pub old_rank_header: &'static str,
    pub new_rank_header: &'static str,
    pub coefficient_header: &'static str,
    pub valid_count_header: &'static str,
    pub total_header: &'static str,
    pub average_header: &'static str,
    pub winner_header: &'static str,
    pub yes: &'static str,
    pub no: &'static str,
    /// Written in place of a missing coefficient.
    pub placeholder: &'static str,
    pub detail_sheet: &'static str,
    pub summary_sheet: &'static str,
    pub report_stem: &'static str,
    pub new_group_prefix: &'static str,
    pub seed_group_name: &'static str,
    pub seed_members: [&'static str; 2],
}

pub const CHINESE: Labels = Labels {
    group_header: "分组名称",
    name_header: "姓名",
    old_rank_header: "前次排名",
    new_rank_header: "后次排名",
    coefficient_header: "进退步系数",
    valid_count_header: "人数",
    total_header: "总进退步系数",
    average_header: "平均进退步系数",
    winner_header: "是否优胜组",
    yes: "是",
    no: "否",
    placeholder: "--",
    detail_sheet: "全员明细",
    summary_sheet: "各组汇总",
    report_stem: "全量进退步分析报告",
    new_group_prefix: "新分组",
    seed_group_name: "第一组",
    seed_members: ["张三", "李四"],
};

pub const ENGLISH: Labels = Labels {
    group_header: "Group",
    name_header: "Name",
    old_rank_header: "Previous Rank",
    new_rank_header: "Current Rank",
    coefficient_header: "Coefficient",
    valid_count_header: "Valid Members",
    total_header: "Total Coefficient",
    average_header: "Average Coefficient",
    winner_header: "Winner",
    yes: "yes",
    no: "no",
    placeholder: "--",
    detail_sheet: "all-members detail",
    summary_sheet: "group summary",
    report_stem: "progress-report",
    new_group_prefix: "New Group",
    seed_group_name: "Group 1",
    seed_members: ["Zhang San", "Li Si"],
};

impl Locale {
    pub fn labels(self) -> &'static Labels {
        match self {
            Locale::Chinese => &CHINESE,
            Locale::English => &ENGLISH,
        }
    }

    /// Localized first, English fallback. Import tries labels in this order.
    pub fn all() -> [Locale; 2] {
        [Locale::Chinese, Locale::English]
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zh" | "zh-cn" | "chinese" => Ok(Locale::Chinese),
            "en" | "en-us" | "english" => Ok(Locale::English),
            other => Err(format!("unknown locale '{}'", other)),
        }
    }
}
