//! Tracked accounts and their local bio overrides, compiled in.

use std::collections::HashMap;

use twilight_model::id::Id;
use twilight_model::id::marker::UserMarker;

struct RosterEntry {
    id: u64,
    bio: &'static str,
}

const TEAM_MEMBERS: &[RosterEntry] = &[
    // 00
    RosterEntry { id: 872882541336625193, bio: "" },
    // windows_11_pro
    RosterEntry { id: 798476169703587890, bio: "Hello,我是Windows11Pro，喜欢python,cpp，同時也是一名硬件發燒友。" },
    // codeaduck
    RosterEntry { id: 830618219646943244, bio: "你好！我是 Codeaduck，專注於抓取網頁漏洞。目前在HackerOne平台上打工。" },
    // cutebear.py
    RosterEntry { id: 1325245481189773315, bio: "一個爛爛的python開發者" },
    // Dyeus(.w..w.)
    RosterEntry { id: 771690984844296192, bio: "不幹正事又在摸魚的某人(其實就在寫bot)" },
    // GH
    RosterEntry { id: 729568770808610917, bio: "我是 ChinGH，喜歡 js py golang html css java，目前正在用 NodeJs 寫 DC 機器人。" },
    // Hello Phone
    RosterEntry { id: 622373851333918720, bio: "一個設計網站總能弄出一坨東西的人(QQ)" },
    // Kirano
    RosterEntry { id: 971240439631986790, bio: "i have no idea..." },
    // fuma_nama
    RosterEntry { id: 572329183334891520, bio: "A Software Engineer living in Hong Kong, passionated about creation and innovation." },
    // windowsed
    RosterEntry { id: 906415095473655810, bio: "Hong Kong Developer" },
    // Mantou
    RosterEntry { id: 644504218798915634, bio: "哈嘍！我叫饅頭，一個java和typescript開發者。" },
];

const BOTS: &[RosterEntry] = &[
    // Empressival
    RosterEntry { id: 942082423846486056, bio: "Empressival: Valorant 助手，支持商店、通行證、對戰紀錄查詢。" },
    // Junior HiZollo
    RosterEntry { id: 584677291318312963, bio: "Junior HiZollo: 功能完整的 Discord 機器人，專注於身份組管理。" },
    // GH Bot
    RosterEntry { id: 837564399833055272, bio: "A Multi Functions Discord Bot" },
    // Ticket Bot
    RosterEntry { id: 955466249482150018, bio: "Ticket Bot: 支持 Web 控制面板的客服單系統。" },
];

/// The two ordered account lists a refresh cycle walks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    pub team: Vec<Id<UserMarker>>,
    pub bots: Vec<Id<UserMarker>>,
}

impl Roster {
    pub fn new(team: Vec<Id<UserMarker>>, bots: Vec<Id<UserMarker>>) -> Self {
        Self { team, bots }
    }

    /// The compiled-in team and bot lists.
    pub fn builtin() -> Self {
        Self {
            team: TEAM_MEMBERS.iter().map(|e| Id::new(e.id)).collect(),
            bots: BOTS.iter().map(|e| Id::new(e.id)).collect(),
        }
    }
}

/// Bio overrides for every compiled-in account, team and bots combined.
pub fn builtin_bio_overrides() -> HashMap<Id<UserMarker>, String> {
    TEAM_MEMBERS
        .iter()
        .chain(BOTS)
        .map(|e| (Id::new(e.id), e.bio.to_string()))
        .collect()
}
