//! Tolerant pose frame decoder
//!
//! Trackers send loosely-formed JSON objects. Decoding never fails: fields
//! that are missing or malformed fall back to their defaults, bad numeric
//! tokens are skipped one by one, and a damaged member is skipped by
//! resynchronizing on the next separator. Fields the top-level walk cannot
//! reach are recovered by scanning the raw text for their keys.
//!
//! ```text
//! { "gender": "female", "event": "entered",
//!   "bones": { "LeftUpperArm": [0.0, -1.0, 0.0], ... } }
//! ```

use glam::Vec3;

use mimic_core::{BoneMap, Gender, PoseFrame, PresenceEvent};

/// Minimum number of valid components for a bone entry to be kept
pub const BONE_COMPONENTS: usize = 3;

/// Decode a text message into a pose frame.
///
/// `gender`, `event` and `bones` are extracted independently. Top-level
/// members read by the structured pass take precedence; a field that pass
/// could not recover (damaged text before it, nested placement) is then
/// looked up by scanning the raw text, so one broken member never hides
/// another.
pub fn decode_frame(text: &str) -> PoseFrame {
    let members = read_members(text);
    let mut frame = PoseFrame::default();

    if let Some(label) = members.gender.or_else(|| scan_label(text, "gender")) {
        frame.gender = Gender::parse(&label);
    }
    if let Some(label) = members.event.or_else(|| scan_label(text, "event")) {
        frame.event = PresenceEvent::parse(&label);
    }
    if let Some(map) = members.bones.or_else(|| scan_bones(text)) {
        frame.bones = map;
    }
    frame
}

/// Fields recovered from the top-level object
#[derive(Default)]
struct Members {
    gender: Option<String>,
    event: Option<String>,
    bones: Option<BoneMap>,
}

/// Structured pass over the top-level object; the first occurrence of each key wins
fn read_members(text: &str) -> Members {
    let mut reader = Reader::new(text);
    let mut members = Members::default();

    reader.skip_ws();
    if !reader.eat(b'{') {
        return members;
    }

    loop {
        reader.skip_ws();
        match reader.peek() {
            None | Some(b'}') => break,
            Some(b',') => {
                reader.bump();
                continue;
            }
            _ => {}
        }

        let Some(key) = reader.member_key() else {
            if !reader.resync() {
                break;
            }
            continue;
        };

        reader.skip_ws();
        let ok = if key.eq_ignore_ascii_case("gender") && members.gender.is_none() {
            read_label(&mut reader, &mut members.gender)
        } else if key.eq_ignore_ascii_case("event") && members.event.is_none() {
            read_label(&mut reader, &mut members.event)
        } else if key.eq_ignore_ascii_case("bones")
            && members.bones.is_none()
            && reader.peek() == Some(b'{')
        {
            match reader.bone_object() {
                Some(map) => {
                    members.bones = Some(map);
                    true
                }
                None => false,
            }
        } else {
            reader.skip_value()
        };

        if !ok && !reader.resync() {
            break;
        }
    }
    members
}

/// Byte offsets of every `"key"` in `text`, ASCII case-insensitive
fn key_positions<'a>(text: &'a str, key: &'a str) -> impl Iterator<Item = usize> + 'a {
    let bytes = text.as_bytes();
    let width = key.len() + 2;
    (0..bytes.len().saturating_sub(width - 1)).filter(move |&i| {
        bytes[i] == b'"'
            && bytes[i + width - 1] == b'"'
            && bytes[i + 1..i + width - 1].eq_ignore_ascii_case(key.as_bytes())
    })
}

fn skip_ws_at(bytes: &[u8], mut i: usize) -> usize {
    while matches!(bytes.get(i), Some(b' ' | b'\t' | b'\n' | b'\r')) {
        i += 1;
    }
    i
}

/// First `"key" : "value"` anywhere in the text with a non-empty value, lower-cased
fn scan_label(text: &str, key: &str) -> Option<String> {
    let bytes = text.as_bytes();
    key_positions(text, key).find_map(|at| {
        let mut i = skip_ws_at(bytes, at + key.len() + 2);
        if bytes.get(i) != Some(&b':') {
            return None;
        }
        i = skip_ws_at(bytes, i + 1);
        if bytes.get(i) != Some(&b'"') {
            return None;
        }
        let len = bytes[i + 1..].iter().position(|&b| b == b'"')?;
        (len > 0).then(|| text[i + 1..i + 1 + len].to_lowercase())
    })
}

/// The brace-balanced span opened by the first `{` after the first `"bones"` key
fn scan_bones(text: &str) -> Option<BoneMap> {
    let bytes = text.as_bytes();
    let key = key_positions(text, "bones").next()?;
    let open = key + bytes[key..].iter().position(|&b| b == b'{')?;

    let mut depth = 0usize;
    for (offset, &b) in bytes[open..].iter().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(scan_bone_entries(&text[open..=open + offset]));
                }
            }
            _ => {}
        }
    }
    None
}

/// Every `"Name": [t0, t1, ...]` in `span`, matched on its own
fn scan_bone_entries(span: &str) -> BoneMap {
    let bytes = span.as_bytes();
    let mut bones = BoneMap::new();
    let mut i = 0;

    while let Some(found) = bytes[i..].iter().position(|&b| b == b'"') {
        let name_start = i + found + 1;
        let name_len = bytes[name_start..]
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
            .count();
        // Resume on the byte after the name so its closing quote can open the next match
        i = name_start + name_len;
        if name_len == 0 || bytes.get(i) != Some(&b'"') {
            continue;
        }

        let mut j = skip_ws_at(bytes, i + 1);
        if bytes.get(j) != Some(&b':') {
            continue;
        }
        j = skip_ws_at(bytes, j + 1);
        if bytes.get(j) != Some(&b'[') {
            continue;
        }
        let Some(len) = bytes[j + 1..].iter().position(|&b| b == b']') else {
            continue;
        };

        let values: Vec<f32> = span[j + 1..j + 1 + len]
            .split(',')
            .filter_map(parse_component)
            .collect();
        if values.len() >= BONE_COMPONENTS {
            bones.insert(
                span[name_start..name_start + name_len].to_string(),
                Vec3::new(values[0], values[1], values[2]),
            );
        }
        i = j + 1 + len + 1;
    }
    bones
}

/// Read a string value into `slot`; non-string values are skipped and leave it unset
fn read_label(reader: &mut Reader<'_>, slot: &mut Option<String>) -> bool {
    if reader.peek() == Some(b'"') {
        match reader.string() {
            Some(s) => {
                *slot = Some(s.to_lowercase());
                true
            }
            None => false,
        }
    } else {
        reader.skip_value()
    }
}

/// Byte cursor over the message text
struct Reader<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    #[inline]
    fn bytes(&self) -> &'a [u8] {
        self.text.as_bytes()
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    #[inline]
    fn bump(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.bump();
        }
    }

    /// `"key" :` - leaves the cursor on the value
    fn member_key(&mut self) -> Option<String> {
        if self.peek() != Some(b'"') {
            return None;
        }
        let key = self.string()?;
        self.skip_ws();
        if !self.eat(b':') {
            return None;
        }
        Some(key)
    }

    /// Quoted string with the common escapes resolved
    fn string(&mut self) -> Option<String> {
        if !self.eat(b'"') {
            return None;
        }
        let mut out = String::new();
        let mut run_start = self.pos;
        loop {
            match self.peek()? {
                b'"' => {
                    out.push_str(&self.text[run_start..self.pos]);
                    self.bump();
                    return Some(out);
                }
                b'\\' => {
                    out.push_str(&self.text[run_start..self.pos]);
                    self.bump();
                    let esc = self.peek()?;
                    self.bump();
                    match esc {
                        b'n' => out.push('\n'),
                        b't' => out.push('\t'),
                        b'r' => out.push('\r'),
                        b'b' => out.push('\u{8}'),
                        b'f' => out.push('\u{c}'),
                        b'u' => {
                            let hex = self.text.get(self.pos..self.pos + 4)?;
                            let code = u32::from_str_radix(hex, 16).ok()?;
                            out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                            self.pos += 4;
                        }
                        other if other.is_ascii() => out.push(other as char),
                        _ => return None,
                    }
                    run_start = self.pos;
                }
                _ => self.bump(),
            }
        }
    }

    /// Skip a string without decoding it
    fn skip_string(&mut self) -> bool {
        if !self.eat(b'"') {
            return false;
        }
        while let Some(b) = self.peek() {
            self.bump();
            match b {
                b'"' => return true,
                b'\\' => self.bump(),
                _ => {}
            }
        }
        false
    }

    /// Skip one value of any shape. Returns false on truncation.
    fn skip_value(&mut self) -> bool {
        match self.peek() {
            None => false,
            Some(b'"') => self.skip_string(),
            Some(b'{' | b'[') => self.skip_nested(),
            Some(_) => {
                while let Some(b) = self.peek() {
                    if matches!(b, b',' | b'}' | b']') {
                        break;
                    }
                    self.bump();
                }
                true
            }
        }
    }

    /// Skip a balanced `{..}` / `[..]` span, strings included
    fn skip_nested(&mut self) -> bool {
        let mut depth = 0usize;
        while let Some(b) = self.peek() {
            match b {
                b'"' => {
                    if !self.skip_string() {
                        return false;
                    }
                    continue;
                }
                b'{' | b'[' => depth += 1,
                b'}' | b']' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.bump();
                        return true;
                    }
                }
                _ => {}
            }
            self.bump();
        }
        false
    }

    /// Advance to the next member separator of the enclosing object.
    ///
    /// Stops on `,` (consumed) or the closing `}` (left in place). Returns
    /// false when the text runs out first.
    fn resync(&mut self) -> bool {
        let mut depth = 0usize;
        while let Some(b) = self.peek() {
            match b {
                b'"' => {
                    if !self.skip_string() {
                        return false;
                    }
                    continue;
                }
                b'{' | b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                b'}' if depth == 0 => return true,
                b'}' => depth -= 1,
                b',' if depth == 0 => {
                    self.bump();
                    return true;
                }
                _ => {}
            }
            self.bump();
        }
        false
    }

    /// The `bones` object. Entries are only committed once the object closes.
    fn bone_object(&mut self) -> Option<BoneMap> {
        if !self.eat(b'{') {
            return None;
        }
        let mut bones = BoneMap::new();
        loop {
            self.skip_ws();
            match self.peek()? {
                b'}' => {
                    self.bump();
                    return Some(bones);
                }
                b',' => {
                    self.bump();
                    continue;
                }
                _ => {}
            }

            let Some(name) = self.member_key() else {
                if !self.resync() {
                    return None;
                }
                continue;
            };

            self.skip_ws();
            let ok = if self.peek() == Some(b'[') {
                match self.number_list() {
                    Some(values) => {
                        if values.len() >= BONE_COMPONENTS {
                            bones.insert(name, Vec3::new(values[0], values[1], values[2]));
                        }
                        true
                    }
                    None => false,
                }
            } else {
                self.skip_value()
            };

            if !ok && !self.resync() {
                return None;
            }
        }
    }

    /// `[t0, t1, ...]` where each token is parsed on its own and dropped if invalid
    fn number_list(&mut self) -> Option<Vec<f32>> {
        if !self.eat(b'[') {
            return None;
        }
        let mut values = Vec::new();
        let mut token_start = self.pos;
        let mut depth = 0usize;
        loop {
            match self.peek()? {
                b'"' => {
                    if !self.skip_string() {
                        return None;
                    }
                    continue;
                }
                b'[' | b'{' => depth += 1,
                b'}' => depth = depth.saturating_sub(1),
                b']' if depth > 0 => depth -= 1,
                b',' | b']' if depth == 0 => {
                    if let Some(v) = parse_component(&self.text[token_start..self.pos]) {
                        values.push(v);
                    }
                    let closed = self.peek() == Some(b']');
                    self.bump();
                    if closed {
                        return Some(values);
                    }
                    token_start = self.pos;
                    continue;
                }
                _ => {}
            }
            self.bump();
        }
    }
}

/// A single numeric token; anything that isn't a finite float is rejected
fn parse_component(token: &str) -> Option<f32> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    token.parse::<f32>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_defaults_when_fields_missing() {
        let frame = decode_frame(r#"{"type":"pose"}"#);
        assert_eq!(frame.gender, Gender::Unknown);
        assert_eq!(frame.event, PresenceEvent::None);
        assert!(frame.bones.is_empty());
    }

    #[test]
    fn test_garbage_yields_default_frame() {
        for text in ["", "not json", "[1,2,3]", "{", "\"bones\"", "{\"gender\":"] {
            assert_eq!(decode_frame(text), PoseFrame::default(), "input {:?}", text);
        }
    }

    #[test]
    fn test_entered_female() {
        let frame = decode_frame(r#"{"event":"entered","gender":"female"}"#);
        assert_eq!(frame.gender, Gender::Female);
        assert_eq!(frame.event, PresenceEvent::Entered);
        assert!(frame.bones.is_empty());
    }

    #[test]
    fn test_keys_and_values_case_insensitive() {
        let frame = decode_frame(r#"{"GENDER":"Male","Event":"LEFT"}"#);
        assert_eq!(frame.gender, Gender::Male);
        assert_eq!(frame.event, PresenceEvent::Left);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let frame = decode_frame(r#"{"gender":"female","gender":"male"}"#);
        assert_eq!(frame.gender, Gender::Female);
    }

    #[test]
    fn test_non_string_label_is_ignored() {
        let frame = decode_frame(r#"{"gender":7,"gender":"female","event":null}"#);
        assert_eq!(frame.gender, Gender::Female);
        assert_eq!(frame.event, PresenceEvent::None);
    }

    #[test]
    fn test_bone_exact_three() {
        let frame = decode_frame(r#"{"bones":{"LeftUpperArm":[0.25,-1.5,3e-2]}}"#);
        assert_eq!(
            frame.bones.get("LeftUpperArm"),
            Some(&Vec3::new(0.25, -1.5, 0.03))
        );
    }

    #[test]
    fn test_extra_components_truncated() {
        let frame = decode_frame(r#"{"bones":{"Neck":[1, 2, 3, 4, 5]}}"#);
        assert_eq!(frame.bones.get("Neck"), Some(&Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_short_entries_dropped() {
        let frame = decode_frame(r#"{"bones":{"A":[1,2],"B":[],"C":[1,2,3]}}"#);
        assert!(!frame.bones.contains_key("A"));
        assert!(!frame.bones.contains_key("B"));
        assert!(frame.bones.contains_key("C"));
    }

    #[test]
    fn test_bad_tokens_skipped_individually() {
        let frame = decode_frame(r#"{"bones":{"Spine":[1, abc, 2, "x", NaN, 3]}}"#);
        assert_eq!(frame.bones.get("Spine"), Some(&Vec3::new(1.0, 2.0, 3.0)));

        let frame = decode_frame(r#"{"bones":{"Spine":[1, abc, 2]}}"#);
        assert!(frame.bones.is_empty());
    }

    #[test]
    fn test_non_array_bone_values_ignored() {
        let frame = decode_frame(r#"{"bones":{"Hips":"up","Chest":{"x":1},"Neck":[0,1,0]}}"#);
        assert_eq!(frame.bones.len(), 1);
        assert_eq!(frame.bones.get("Neck"), Some(&Vec3::Y));
    }

    #[test]
    fn test_unbalanced_bones_yield_empty_set() {
        let frame = decode_frame(r#"{"gender":"male","bones":{"Neck":[0,1,0]"#);
        assert_eq!(frame.gender, Gender::Male);
        assert!(frame.bones.is_empty());
    }

    #[test]
    fn test_bones_not_an_object() {
        let frame = decode_frame(r#"{"bones":[1,2,3],"event":"left"}"#);
        assert!(frame.bones.is_empty());
        assert_eq!(frame.event, PresenceEvent::Left);
    }

    #[test]
    fn test_malformed_member_does_not_hide_later_fields() {
        let frame = decode_frame(r#"{"junk": tru e ], "event":"entered", 42, "gender":"female"}"#);
        assert_eq!(frame.event, PresenceEvent::Entered);
        assert_eq!(frame.gender, Gender::Female);
    }

    #[test]
    fn test_unterminated_string_does_not_hide_event() {
        let frame = decode_frame(r#"{"note":"abc, "event":"left"}"#);
        assert_eq!(frame.event, PresenceEvent::Left);
    }

    #[test]
    fn test_unclosed_bone_array_does_not_hide_event() {
        let frame = decode_frame(r#"{"bones":{"LeftUpperArm":[1,2,3}, "event":"left"}"#);
        assert_eq!(frame.event, PresenceEvent::Left);
        assert!(frame.bones.is_empty());
    }

    #[test]
    fn test_nested_event_found() {
        let frame = decode_frame(r#"{"meta":{"event":"left","gender":"FEMALE"}}"#);
        assert_eq!(frame.event, PresenceEvent::Left);
        assert_eq!(frame.gender, Gender::Female);
    }

    #[test]
    fn test_top_level_member_beats_nested() {
        let frame = decode_frame(r#"{"meta":{"event":"entered"},"event":"left"}"#);
        assert_eq!(frame.event, PresenceEvent::Left);
    }

    #[test]
    fn test_bones_recovered_after_damaged_member() {
        let frame = decode_frame(
            r#"{"note":"x, "bones":{"Neck":[0,1,0],"Spine":[1,bad,2],"Hips":[0, 0, 1, 9]}}"#,
        );
        assert_eq!(frame.bones.len(), 2);
        assert_eq!(frame.bones.get("Neck"), Some(&Vec3::Y));
        assert_eq!(frame.bones.get("Hips"), Some(&Vec3::Z));
    }

    #[test]
    fn test_escaped_strings() {
        let frame = decode_frame(r#"{"note":"a \"quoted\" } brace","gender":"female"}"#);
        assert_eq!(frame.gender, Gender::Female);
    }

    #[test]
    fn test_full_tracker_message() {
        let text = r#"{"type": "pose", "gender": "male", "event": "none",
            "bones": {"LeftUpperArm": [0.0, -1.0, 0.0], "ChestForward": [0.0, 0.0, 1.0],
                      "ChestUp": [0.0, 1.0, 0.0], "Spine2": [0.1, 0.9, 0.0]}}"#;
        let frame = decode_frame(text);
        assert_eq!(frame.gender, Gender::Male);
        assert_eq!(frame.event, PresenceEvent::None);
        assert_eq!(frame.bones.len(), 4);
        assert_eq!(frame.vector("ChestForward"), Vec3::Z);
    }

    proptest! {
        #[test]
        fn prop_decode_never_panics(text in ".*") {
            let _ = decode_frame(&text);
        }

        #[test]
        fn prop_decode_never_panics_on_structured_noise(
            text in r#"[\{\}\[\]",:a-z0-9\. \\-]{0,64}"#
        ) {
            let _ = decode_frame(&text);
        }

        #[test]
        fn prop_three_components_exact(
            x in -1.0e6f32..1.0e6,
            y in -1.0e6f32..1.0e6,
            z in -1.0e6f32..1.0e6,
        ) {
            let text = format!(r#"{{"bones":{{"LeftLowerLeg":[{:?},{:?},{:?}]}}}}"#, x, y, z);
            let frame = decode_frame(&text);
            prop_assert_eq!(frame.bones.get("LeftLowerLeg"), Some(&Vec3::new(x, y, z)));
        }
    }
}
