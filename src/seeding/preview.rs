use serde::Serialize;

use crate::domain::Participant;

#[derive(Debug, Clone, Serialize)]
pub struct GroupPreview {
    pub name: String,
    pub participants: Vec<Participant>,
}

/// "Group A" .. "Group Z", then "Group AA", "Group AB", ...
pub fn group_name(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.reverse();
    format!("Group {}", letters.into_iter().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_names() {
        assert_eq!(group_name(0), "Group A");
        assert_eq!(group_name(7), "Group H");
        assert_eq!(group_name(25), "Group Z");
        assert_eq!(group_name(26), "Group AA");
        assert_eq!(group_name(27), "Group AB");
    }
}
