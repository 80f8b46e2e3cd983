//! Code point decoding for the requested character list.

/// The number of bytes in the sequence introduced by `lead`. Anything that is not a one, two or
/// three byte lead is read as a four byte sequence.
fn sequence_len(lead: u8) -> usize {
    if lead < 0x80 {
        1
    } else if lead & 0xE0 == 0xC0 {
        2
    } else if lead & 0xF0 == 0xE0 {
        3
    } else {
        4
    }
}

/// Decodes UTF-8 text into code points, keyed on each leading byte.
///
/// Continuation bytes are not validated, so malformed input decodes to whatever its bits say
/// rather than failing. A sequence cut short by the end of the input is dropped.
#[must_use]
pub fn decode_utf8(input: &[u8]) -> Vec<u32> {
    let mut code_points = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        let lead = input[i];
        let len = sequence_len(lead);
        let Some(tail) = input.get(i + 1..i + len) else {
            log::warn!("Dropping a UTF-8 sequence truncated by the end of the input");
            break;
        };

        let head = match len {
            1 => u32::from(lead),
            2 => u32::from(lead & 0x1F),
            3 => u32::from(lead & 0x0F),
            _ => u32::from(lead & 0x07),
        };
        let code_point = tail
            .iter()
            .fold(head, |acc, &b| (acc << 6) | u32::from(b & 0x3F));
        code_points.push(code_point);
        i += len;
    }
    code_points
}
