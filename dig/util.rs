use encoding8::ascii;
use std::fmt::Write;

/// Formats the slice in a pretty way, sixteen bytes a row.
pub fn hexdump(slice: &[u8]) -> String {
    const WIDTH: usize = 16;
    let mut out = String::new();

    for (i, row) in slice.chunks(WIDTH).enumerate() {
        let row_hex: String = row.iter().map(|x| format!("{0:02X} ", x)).collect();

        // For each byte on this row, only print out the ascii printable ones.
        let row_str: String = row
            .iter()
            .map(|x| {
                if ascii::is_printable(*x) {
                    *x as char
                } else {
                    '.'
                }
            })
            .collect();

        // Writing to a String can't fail.
        let _ = writeln!(out, "{0:>08x}: {1:<48} {2:}", i * WIDTH, row_hex, row_str);
    }

    out
}
