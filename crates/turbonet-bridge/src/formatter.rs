//! Response formatters: one pure function per command.
//!
//! Each formatter takes the decoded JSON body and returns the reply as
//! ordered lines. Shared rules:
//! - numbers render with a fixed precision; missing or non-numeric values
//!   render as `未知`
//! - an absent optional field drops its whole line
//! - lists are cut to a fixed cap before rendering, never reordered
//! - status codes go through a per-formatter table with identity fallback
//!
//! Nothing in here can fail; malformed shapes degrade to fallbacks.

use serde_json::{Map, Value};

/// Fallback for numbers that are missing or not numeric.
pub const UNKNOWN: &str = "未知";

/// Entries shown per score list (best / recent).
pub const MAX_SCORE_ENTRIES: usize = 3;
/// Arcades shown by the user-facing status command.
pub const MAX_STATUS_ENTRIES: usize = 5;
/// Players shown in the arcade roster.
pub const MAX_ROSTER_ENTRIES: usize = 10;
/// Ticket multiplier set by the `/go` shortcut.
pub const QUICK_TICKET_ID: i64 = 6;

/// Status code -> display string, with identity fallback for unknown codes.
#[derive(Debug, Clone, Copy)]
pub struct StatusTable(&'static [(&'static str, &'static str)]);

impl StatusTable {
    pub fn translate<'a>(&self, code: &'a str) -> &'a str {
        self.0
            .iter()
            .find(|(k, _)| *k == code)
            .map(|(_, v)| *v)
            .unwrap_or(code)
    }
}

/// Labels for the user-facing `/mai_status` command.
pub const USER_STATUS_LABELS: StatusTable = StatusTable(&[
    ("WORKING", "正常"),
    ("WARNING", "警告"),
    ("ERROR", "错误"),
    ("UNKNOWN", "未知"),
]);

/// Labels for the admin `/net` command.
pub const ADMIN_STATUS_LABELS: StatusTable = StatusTable(&[
    ("WORKING", "工作中"),
    ("WARNING", "警告"),
    ("ERROR", "掉线啦！！！"),
    ("UNKNOWN", "未知"),
]);

// ---------------------------------------------------------------------------
// Value helpers
// ---------------------------------------------------------------------------

/// Numeric view of a JSON value. Accepts numbers, numeric strings and booleans.
fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Render a number with `decimals` places and an optional suffix.
///
/// Absent, null or non-numeric input renders as [`UNKNOWN`].
pub fn fmt_number(value: Option<&Value>, decimals: usize, suffix: Option<&str>) -> String {
    match value.and_then(as_f64) {
        Some(num) => format!("{num:.decimals$}{}", suffix.unwrap_or("")),
        None => UNKNOWN.to_string(),
    }
}

/// Integer view of a JSON value for human-readable counts. Never fails:
/// anything that does not look like a number becomes 0. Fractions truncate.
pub fn to_int(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f.trunc() as i64)
                })
                .unwrap_or(0)
        }
        Some(Value::Bool(b)) => i64::from(*b),
        _ => 0,
    }
}

/// Truthiness: null, false, 0, "", [] and {} are all falsy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

/// The value if present and not null.
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// The value if truthy.
fn truthy(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| is_truthy(Some(*v)))
}

/// Plain-text rendering: strings without quotes, everything else as JSON.
pub fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Display the value if truthy, otherwise `fallback`.
fn text_or(value: Option<&Value>, fallback: &str) -> String {
    truthy(value)
        .map(display)
        .unwrap_or_else(|| fallback.to_string())
}

static EMPTY_OBJECT: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();

/// Object view of a field; non-objects read as empty.
fn object(value: Option<&Value>) -> &Map<String, Value> {
    match value {
        Some(Value::Object(map)) => map,
        _ => EMPTY_OBJECT.get_or_init(Map::new),
    }
}

/// Array view of a field; non-arrays read as empty.
fn array(value: Option<&Value>) -> &[Value] {
    match value {
        Some(Value::Array(items)) => items,
        _ => &[],
    }
}

// ---------------------------------------------------------------------------
// bind
// ---------------------------------------------------------------------------

/// Bind confirmation. `data` is the `/bot/bind` body; the key itself is never echoed.
pub fn format_bind(data: &Value) -> Vec<String> {
    let mut lines = vec!["绑定成功！".to_string()];
    if let Some(bot_id) = truthy(data.get("botId")) {
        lines.push(format!("你的 botId：{}", display(bot_id)));
    }
    lines.push("已为当前 QQ 绑定专属 BotKey。".to_string());
    lines.push("后续所有查询与操作都会使用：".to_string());
    lines.push("Authorization: BotKey <你的botKey>".to_string());
    lines
}

// ---------------------------------------------------------------------------
// mai (profile)
// ---------------------------------------------------------------------------

/// Player profile overview for `/mai`.
pub fn format_profile(data: &Value, requested_name: &str) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(format!(
        "TurboNET 用户：{}",
        text_or(data.get("turboName"), requested_name)
    ));
    lines.push(format!(
        "maimai 名称：{}",
        text_or(data.get("maimaiName"), "（未设置）")
    ));
    if let Some(qq) = truthy(data.get("qqNumber")) {
        lines.push(format!("绑定 QQ：{}", display(qq)));
    }
    if let Some(is_me) = present(data.get("isMe")) {
        let label = if is_truthy(Some(is_me)) { "是" } else { "否" };
        lines.push(format!("是否本人：{label}"));
    }
    if let Some(permission) = truthy(data.get("permission")) {
        lines.push(format!("权限等级：{}", display(permission)));
    }
    if let Some(times) = truthy(data.get("warningTimes")) {
        lines.push(format!("警告次数：{}", display(times)));
    }
    if let Some(msg) = truthy(data.get("warningMessage")) {
        lines.push(format!("最近警告：{}", display(msg)));
    }
    if is_truthy(data.get("isBanned")) {
        lines.push(format!(
            "封禁状态：已封禁（{}）",
            text_or(data.get("bannedMessage"), "无说明")
        ));
    }

    push_statistics(&mut lines, object(data.get("maiStatistics")));
    push_play_activity(&mut lines, object(data.get("playActivity")));
    push_best_scores(&mut lines, array(data.get("best35")));
    push_recent_scores(&mut lines, array(data.get("recentScores")));

    lines
}

fn push_statistics(lines: &mut Vec<String>, stats: &Map<String, Value>) {
    lines.push(String::new());
    lines.push("=== 综合数据 ===".to_string());
    lines.push(format!(
        "DX Rating：{}",
        fmt_number(stats.get("deluxRating"), 0, None)
    ));
    if let Some(rank) = present(stats.get("serverRanking")) {
        lines.push(format!("服务器排名：#{}", display(rank)));
    }
    if let Some(acc) = present(stats.get("averageAccuracy")) {
        lines.push(format!("平均达成率：{}", fmt_number(Some(acc), 2, Some("%"))));
    }
    if let Some(v) = present(stats.get("maxCombo")) {
        lines.push(format!("历史最大连击：{}", display(v)));
    }
    if let Some(v) = present(stats.get("fullCombo")) {
        lines.push(format!("Full Combo 数：{}", display(v)));
    }
    if let Some(v) = present(stats.get("allPerfect")) {
        lines.push(format!("All Perfect 数：{}", display(v)));
    }
    if let Some(v) = present(stats.get("totalScores")) {
        lines.push(format!("总成绩数：{}", display(v)));
    }
}

fn push_play_activity(lines: &mut Vec<String>, play: &Map<String, Value>) {
    lines.push(String::new());
    lines.push("=== 游玩情况 ===".to_string());
    if let Some(v) = present(play.get("playCount")) {
        lines.push(format!("总游玩次数：{}", display(v)));
    }
    if let Some(v) = present(play.get("playTime")) {
        lines.push(format!("总游玩时长：{} 小时", fmt_number(Some(v), 1, None)));
    }
    if let Some(v) = truthy(play.get("firstPlay")) {
        lines.push(format!("首次游玩：{}", display(v)));
    }
    if let Some(last) = truthy(play.get("lastPlay")) {
        match truthy(play.get("playVersion")) {
            Some(version) => lines.push(format!(
                "最近游玩：{}（版本：{}）",
                display(last),
                display(version)
            )),
            None => lines.push(format!("最近游玩：{}", display(last))),
        }
    }
}

/// `"{i}. {name} [{level}]"` plus any extras after `" | "`.
fn score_line(
    index: usize,
    song: &Map<String, Value>,
    head_extra: Option<String>,
    extras: Vec<String>,
) -> String {
    let mut head = vec![format!(
        "{index}. {}",
        text_or(song.get("musicName"), "未知曲目")
    )];
    if let Some(level) = present(song.get("level")) {
        head.push(format!("[{}]", fmt_number(Some(level), 1, None)));
    }
    if let Some(extra) = head_extra {
        head.push(extra);
    }
    let mut line = head.join(" ");
    if !extras.is_empty() {
        line.push_str(" | ");
        line.push_str(&extras.join(" / "));
    }
    line
}

fn push_best_scores(lines: &mut Vec<String>, best: &[Value]) {
    if best.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push("=== Best 35 Top 3 ===".to_string());
    for (i, entry) in best.iter().take(MAX_SCORE_ENTRIES).enumerate() {
        let song = object(Some(entry));
        let diff = present(song.get("diff")).map(|d| format!("(Diff {})", display(d)));

        let mut extras = Vec::new();
        if let Some(achv) = present(song.get("achievement")) {
            extras.push(format!("达成率 {}", fmt_number(Some(achv), 4, Some("%"))));
        }
        if let Some(score) = present(song.get("score")) {
            extras.push(format!("分数 {}", display(score)));
        }
        if let Some(rank) = truthy(song.get("scoreRank")) {
            extras.push(format!("评级 {}", display(rank)));
        }
        lines.push(score_line(i + 1, song, diff, extras));
    }
}

fn push_recent_scores(lines: &mut Vec<String>, recent: &[Value]) {
    if recent.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push("=== 最近游玩 Top 3 ===".to_string());
    for (i, entry) in recent.iter().take(MAX_SCORE_ENTRIES).enumerate() {
        let song = object(Some(entry));
        let mut extras = Vec::new();
        if let Some(achv) = present(song.get("achievement")) {
            extras.push(format!("达成率 {}", fmt_number(Some(achv), 4, Some("%"))));
        }
        if let Some(rank) = truthy(song.get("scoreRank")) {
            extras.push(format!("评级 {}", display(rank)));
        }
        lines.push(score_line(i + 1, song, None, extras));
    }
}

// ---------------------------------------------------------------------------
// mai_status / net
// ---------------------------------------------------------------------------

const NO_STATUS_DATA: &str = "当前没有机厅状态数据。";

/// Status code of an arcade entry, `UNKNOWN` when missing.
fn working_status(arcade: &Map<String, Value>) -> String {
    text_or(arcade.get("workingStatus"), "UNKNOWN")
}

/// Network status for `/mai_status`: at most [`MAX_STATUS_ENTRIES`] arcades.
pub fn format_network_status(arcades: &[Value]) -> Vec<String> {
    if arcades.is_empty() {
        return vec![NO_STATUS_DATA.to_string()];
    }
    let mut lines = vec![format!(
        "当前 TurboNET 机厅网络状态（最多显示前 {MAX_STATUS_ENTRIES} 条）："
    )];
    for entry in arcades.iter().take(MAX_STATUS_ENTRIES) {
        let arcade = object(Some(entry));
        let status = working_status(arcade);
        lines.push(format!(
            "- {} [{}] 状态：{}（最后心跳：{}）",
            text_or(arcade.get("arcadeName"), "未知机厅"),
            text_or(arcade.get("arcadeType"), "未知类型"),
            USER_STATUS_LABELS.translate(&status),
            text_or(arcade.get("lastHeartbeatSecond"), "未知时间"),
        ));
    }
    lines
}

/// Network status for `/net`: every arcade, numbered from 1.
pub fn format_admin_network_status(arcades: &[Value]) -> Vec<String> {
    if arcades.is_empty() {
        return vec![NO_STATUS_DATA.to_string()];
    }
    arcades
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let arcade = object(Some(entry));
            let status = working_status(arcade);
            format!(
                "{}.{} 状态：{} 最后返回心跳包时间：{}",
                i + 1,
                text_or(arcade.get("arcadeName"), "未知机厅"),
                ADMIN_STATUS_LABELS.translate(&status),
                text_or(arcade.get("lastHeartbeatSecond"), "未知时间"),
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// tickets
// ---------------------------------------------------------------------------

/// Confirmation for `/run X` and `/go`.
pub fn format_ticket_set(ticket_id: i64) -> Vec<String> {
    vec![format!("绑定{ticket_id}倍跑图卷成功")]
}

/// Confirmation for `/norun`.
pub fn format_ticket_reset() -> Vec<String> {
    vec!["取消跑图卷成功".to_string()]
}

/// Current multiplier for `/getrun`.
pub fn format_current_ticket(data: &Value) -> Vec<String> {
    let ticket = object(data.get("turboTicket"));
    let ticket_id = present(ticket.get("ticketId"));
    match ticket_id {
        Some(id) if is_truthy(ticket.get("isEnable")) => {
            vec![format!("当前跑图卷倍率为{}", to_int(Some(id)))]
        }
        _ => vec!["当前未启用跑图卷".to_string()],
    }
}

// ---------------------------------------------------------------------------
// arcade detail
// ---------------------------------------------------------------------------

/// Arcade detail for the `<code>j` trigger.
pub fn format_arcade_detail(data: &Value, arcade_code: &str) -> Vec<String> {
    let info = object(data.get("arcadeInfo"));

    let mut lines = vec![
        text_or(info.get("arcadeName"), arcade_code),
        format!("30分钟内共游玩了{}PC", to_int(data.get("thirtyMinutesPlayer"))),
        format!("一小时内共游玩了{}PC", to_int(data.get("oneHourPlayer"))),
        format!("两小时内共游玩了{}PC", to_int(data.get("twoHoursPlayer"))),
        format!("今日店内共{}PC", to_int(info.get("arcadePlayCount"))),
        "当前店内玩家列表：".to_string(),
    ];

    let players = array(data.get("playerList"));
    if players.is_empty() {
        lines.push("暂无".to_string());
    } else {
        for entry in players.iter().take(MAX_ROSTER_ENTRIES) {
            let player = object(Some(entry));
            lines.push(format!(
                "{} 上机时间{}",
                text_or(player.get("maimaiName"), "未知玩家"),
                text_or(player.get("playdate"), ""),
            ));
        }
    }

    lines.push(format!(
        "网络概况：今日网络请求{}次中，缓存命中{}次，错误修复次数{}次。",
        to_int(info.get("arcadeRequested")),
        to_int(info.get("arcadeCachedRequest")),
        to_int(info.get("arcadeFixedRequest")),
    ));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_int() {
        assert_eq!(to_int(Some(&json!("7"))), 7);
        assert_eq!(to_int(Some(&json!("abc"))), 0);
        assert_eq!(to_int(None), 0);
        assert_eq!(to_int(Some(&Value::Null)), 0);
        assert_eq!(to_int(Some(&json!(3.9))), 3);
        assert_eq!(to_int(Some(&json!(-2.5))), -2);
        assert_eq!(to_int(Some(&json!(" 12 "))), 12);
        assert_eq!(to_int(Some(&json!([1]))), 0);
    }

    #[test]
    fn test_fmt_number() {
        assert_eq!(fmt_number(None, 2, None), "未知");
        assert_eq!(fmt_number(Some(&Value::Null), 2, None), "未知");
        assert_eq!(fmt_number(Some(&json!(12.345)), 2, Some("%")), "12.35%");
        assert_eq!(fmt_number(Some(&json!(15234)), 0, None), "15234");
        assert_eq!(fmt_number(Some(&json!("13.7")), 1, None), "13.7");
        assert_eq!(fmt_number(Some(&json!(100.5)), 4, Some("%")), "100.5000%");
        assert_eq!(fmt_number(Some(&json!("n/a")), 2, None), "未知");
    }

    #[test]
    fn test_status_translation() {
        assert_eq!(USER_STATUS_LABELS.translate("ERROR"), "错误");
        assert_eq!(ADMIN_STATUS_LABELS.translate("ERROR"), "掉线啦！！！");
        assert_eq!(ADMIN_STATUS_LABELS.translate("WORKING"), "工作中");
        assert_eq!(USER_STATUS_LABELS.translate("PAUSED"), "PAUSED");
        assert_eq!(ADMIN_STATUS_LABELS.translate("PAUSED"), "PAUSED");
    }

    #[test]
    fn test_bind_with_and_without_bot_id() {
        let with = format_bind(&json!({"botId": "botId_DObT1uoj", "botKey": "k"}));
        assert_eq!(with[0], "绑定成功！");
        assert_eq!(with[1], "你的 botId：botId_DObT1uoj");
        assert_eq!(with.last().unwrap(), "Authorization: BotKey <你的botKey>");
        assert!(!with.iter().any(|l| l.contains("BotKey k")));

        let without = format_bind(&json!({"botKey": "k"}));
        assert_eq!(without.len(), with.len() - 1);
    }

    #[test]
    fn test_profile_minimal() {
        let lines = format_profile(&json!({}), "AAA_BBB");
        assert_eq!(
            lines,
            vec![
                "TurboNET 用户：AAA_BBB",
                "maimai 名称：（未设置）",
                "",
                "=== 综合数据 ===",
                "DX Rating：未知",
                "",
                "=== 游玩情况 ===",
            ]
        );
    }

    #[test]
    fn test_profile_full() {
        let data = json!({
            "turboName": "AAA_BBB",
            "maimaiName": "ＡＡＡ",
            "qqNumber": "12345",
            "isMe": false,
            "permission": "USER",
            "warningTimes": 0,
            "isBanned": true,
            "maiStatistics": {
                "deluxRating": 15234.6,
                "serverRanking": 12,
                "averageAccuracy": 99.12345,
                "maxCombo": 900,
                "fullCombo": 30,
                "allPerfect": 2,
                "totalScores": 512
            },
            "playActivity": {
                "playCount": 321,
                "playTime": 88.26,
                "firstPlay": "2023-01-01",
                "lastPlay": "2025-06-01",
                "playVersion": "PRiSM"
            }
        });
        let text = format_profile(&data, "ignored").join("\n");
        assert!(text.contains("TurboNET 用户：AAA_BBB"));
        assert!(text.contains("绑定 QQ：12345"));
        assert!(text.contains("是否本人：否"));
        assert!(text.contains("权限等级：USER"));
        assert!(!text.contains("警告次数"));
        assert!(text.contains("封禁状态：已封禁（无说明）"));
        assert!(text.contains("DX Rating：15235"));
        assert!(text.contains("服务器排名：#12"));
        assert!(text.contains("平均达成率：99.12%"));
        assert!(text.contains("总成绩数：512"));
        assert!(text.contains("总游玩时长：88.3 小时"));
        assert!(text.contains("最近游玩：2025-06-01（版本：PRiSM）"));
        assert!(!text.contains("Best 35"));
    }

    #[test]
    fn test_best_scores_truncated_in_order() {
        let best: Vec<Value> = (1..=10)
            .map(|i| json!({"musicName": format!("song{i}"), "level": 13.7, "diff": 3, "achievement": 100.5, "score": 1000000 + i, "scoreRank": "SSS+"}))
            .collect();
        let lines = format_profile(&json!({"best35": best}), "x");
        let entries: Vec<&String> = lines
            .iter()
            .skip_while(|l| *l != "=== Best 35 Top 3 ===")
            .skip(1)
            .collect();
        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries[0],
            "1. song1 [13.7] (Diff 3) | 达成率 100.5000% / 分数 1000001 / 评级 SSS+"
        );
        assert!(entries[1].starts_with("2. song2 "));
        assert!(entries[2].starts_with("3. song3 "));
    }

    #[test]
    fn test_recent_scores_truncated_in_order() {
        let recent: Vec<Value> = (1..=8)
            .map(|i| json!({"musicName": format!("r{i}"), "achievement": 99.0, "scoreRank": "SS"}))
            .collect();
        let lines = format_profile(&json!({"recentScores": recent}), "x");
        let entries: Vec<&String> = lines
            .iter()
            .skip_while(|l| *l != "=== 最近游玩 Top 3 ===")
            .skip(1)
            .collect();
        assert_eq!(entries.len(), MAX_SCORE_ENTRIES);
        assert_eq!(entries[0], "1. r1 | 达成率 99.0000% / 评级 SS");
        assert!(entries[1].starts_with("2. r2 "));
        assert!(entries[2].starts_with("3. r3 "));
    }

    #[test]
    fn test_recent_scores_sparse_entry() {
        let lines = format_profile(&json!({"recentScores": [{}, {"musicName": "x", "scoreRank": "S"}]}), "x");
        let idx = lines.iter().position(|l| l == "=== 最近游玩 Top 3 ===").unwrap();
        assert_eq!(lines[idx + 1], "1. 未知曲目");
        assert_eq!(lines[idx + 2], "2. x | 评级 S");
    }

    #[test]
    fn test_network_status_capped() {
        let arcades: Vec<Value> = (0..7)
            .map(|i| json!({"arcadeName": format!("A{i}"), "arcadeType": "TURBO", "workingStatus": "ERROR", "lastHeartbeatSecond": "12:00:00"}))
            .collect();
        let lines = format_network_status(&arcades);
        assert_eq!(lines.len(), 1 + MAX_STATUS_ENTRIES);
        assert_eq!(lines[1], "- A0 [TURBO] 状态：错误（最后心跳：12:00:00）");
    }

    #[test]
    fn test_network_status_fallbacks() {
        let lines = format_network_status(&[json!({"workingStatus": "PAUSED"}), json!({})]);
        assert_eq!(lines[1], "- 未知机厅 [未知类型] 状态：PAUSED（最后心跳：未知时间）");
        assert_eq!(lines[2], "- 未知机厅 [未知类型] 状态：未知（最后心跳：未知时间）");
    }

    #[test]
    fn test_network_status_empty() {
        assert_eq!(format_network_status(&[]), vec!["当前没有机厅状态数据。"]);
        assert_eq!(format_admin_network_status(&[]), vec!["当前没有机厅状态数据。"]);
    }

    #[test]
    fn test_admin_network_status_uncapped_and_numbered() {
        let arcades: Vec<Value> = (0..7)
            .map(|i| json!({"arcadeName": format!("A{i}"), "workingStatus": "ERROR"}))
            .collect();
        let lines = format_admin_network_status(&arcades);
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "1.A0 状态：掉线啦！！！ 最后返回心跳包时间：未知时间");
        assert!(lines[6].starts_with("7.A6 "));
    }

    #[test]
    fn test_tickets() {
        assert_eq!(format_ticket_set(2), vec!["绑定2倍跑图卷成功"]);
        assert_eq!(format_ticket_reset(), vec!["取消跑图卷成功"]);
        assert_eq!(
            format_current_ticket(&json!({"turboTicket": {"isEnable": false}})),
            vec!["当前未启用跑图卷"]
        );
        assert_eq!(
            format_current_ticket(&json!({"turboTicket": {"isEnable": true}})),
            vec!["当前未启用跑图卷"]
        );
        assert_eq!(
            format_current_ticket(&json!({"turboTicket": {"isEnable": true, "ticketId": "3"}})),
            vec!["当前跑图卷倍率为3"]
        );
        assert_eq!(format_current_ticket(&json!({})), vec!["当前未启用跑图卷"]);
    }

    #[test]
    fn test_arcade_detail() {
        let data = json!({
            "arcadeInfo": {
                "arcadeName": "四川成都FS COMICS动漫",
                "arcadeType": "TURBO",
                "arcadePlayCount": 1,
                "arcadeRequested": 78,
                "arcadeCachedRequest": 33,
                "arcadeFixedRequest": 0
            },
            "thirtyMinutesPlayer": 0,
            "oneHourPlayer": "0",
            "twoHoursPlayer": 1,
            "playerList": []
        });
        assert_eq!(
            format_arcade_detail(&data, "fs"),
            vec![
                "四川成都FS COMICS动漫",
                "30分钟内共游玩了0PC",
                "一小时内共游玩了0PC",
                "两小时内共游玩了1PC",
                "今日店内共1PC",
                "当前店内玩家列表：",
                "暂无",
                "网络概况：今日网络请求78次中，缓存命中33次，错误修复次数0次。",
            ]
        );
    }

    #[test]
    fn test_arcade_detail_roster_and_fallbacks() {
        let players: Vec<Value> = (0..15)
            .map(|i| json!({"maimaiName": format!("P{i}"), "playdate": "2025-06-01 12:00"}))
            .collect();
        let lines = format_arcade_detail(&json!({"playerList": players}), "fs");
        assert_eq!(lines[0], "fs");
        assert_eq!(lines[6], "P0 上机时间2025-06-01 12:00");
        let roster = lines.iter().filter(|l| l.contains("上机时间")).count();
        assert_eq!(roster, MAX_ROSTER_ENTRIES);
        assert_eq!(
            lines.last().unwrap(),
            "网络概况：今日网络请求0次中，缓存命中0次，错误修复次数0次。"
        );
    }
}
