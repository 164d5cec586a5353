//! 세션 중 화면에 보여줄 "여기 머문 시간" 문구

/// 경과 시간(초)을 분 단위 문구로 바꿉니다.
///
/// - 1분 미만: "You've been here for < 1 minute."
/// - 1분: "You've been here for a minute."
/// - 그 이상: "You've been here for N minutes."
pub fn presence_message(elapsed_seconds: i64) -> String {
    match elapsed_seconds.max(0) / 60 {
        0 => "You've been here for < 1 minute.".to_string(),
        1 => "You've been here for a minute.".to_string(),
        minutes => format!("You've been here for {minutes} minutes."),
    }
}
