//! The canonical code point ↔ macro spelling table.
//!
//! The pairs below follow the `\DeclareUnicodeCharacter` declarations of a
//! LaTeX distribution's `utf8enc.dfu`, restricted to Latin-1 Supplement,
//! Latin Extended-A and the common text-symbol macros. Regenerating the list
//! against a different distribution only changes the data, never the
//! transducer: correctness is defined relative to whichever table is in use.
use std::collections::HashMap;
use std::sync::LazyLock;

use super::MacroTable;

/// Code point → macro spelling, ordered by code point. Every spelling is
/// pure ASCII, which is what makes [`utf8_decode`](super::utf8_decode)
/// idempotent.
pub(crate) static DECODE_PAIRS: &[(char, &str)] = &[
    ('\u{00A1}', "\\textexclamdown"), // ¡
    ('\u{00A2}', "\\textcent"), // ¢
    ('\u{00A3}', "\\textsterling"), // £
    ('\u{00A4}', "\\textcurrency"), // ¤
    ('\u{00A5}', "\\textyen"), // ¥
    ('\u{00A6}', "\\textbrokenbar"), // ¦
    ('\u{00A7}', "\\S"), // §
    ('\u{00A9}', "\\textcopyright"), // ©
    ('\u{00AA}', "\\textordfeminine"), // ª
    ('\u{00AB}', "\\guillemotleft"), // «
    ('\u{00AC}', "\\textlnot"), // ¬
    ('\u{00AE}', "\\textregistered"), // ®
    ('\u{00B0}', "\\textdegree"), // °
    ('\u{00B1}', "\\textpm"), // ±
    ('\u{00B2}', "\\texttwosuperior"), // ²
    ('\u{00B3}', "\\textthreesuperior"), // ³
    ('\u{00B5}', "\\textmu"), // µ
    ('\u{00B6}', "\\P"), // ¶
    ('\u{00B7}', "\\textperiodcentered"), // ·
    ('\u{00B9}', "\\textonesuperior"), // ¹
    ('\u{00BA}', "\\textordmasculine"), // º
    ('\u{00BB}', "\\guillemotright"), // »
    ('\u{00BC}', "\\textonequarter"), // ¼
    ('\u{00BD}', "\\textonehalf"), // ½
    ('\u{00BE}', "\\textthreequarters"), // ¾
    ('\u{00BF}', "\\textquestiondown"), // ¿
    ('\u{00C0}', "\\`A"), // À
    ('\u{00C1}', "\\'A"), // Á
    ('\u{00C2}', "\\^A"), // Â
    ('\u{00C3}', "\\~A"), // Ã
    ('\u{00C4}', "\\\"A"), // Ä
    ('\u{00C5}', "\\r A"), // Å
    ('\u{00C6}', "\\AE"), // Æ
    ('\u{00C7}', "\\c C"), // Ç
    ('\u{00C8}', "\\`E"), // È
    ('\u{00C9}', "\\'E"), // É
    ('\u{00CA}', "\\^E"), // Ê
    ('\u{00CB}', "\\\"E"), // Ë
    ('\u{00CC}', "\\`I"), // Ì
    ('\u{00CD}', "\\'I"), // Í
    ('\u{00CE}', "\\^I"), // Î
    ('\u{00CF}', "\\\"I"), // Ï
    ('\u{00D0}', "\\DH"), // Ð
    ('\u{00D1}', "\\~N"), // Ñ
    ('\u{00D2}', "\\`O"), // Ò
    ('\u{00D3}', "\\'O"), // Ó
    ('\u{00D4}', "\\^O"), // Ô
    ('\u{00D5}', "\\~O"), // Õ
    ('\u{00D6}', "\\\"O"), // Ö
    ('\u{00D7}', "\\texttimes"), // ×
    ('\u{00D8}', "\\O"), // Ø
    ('\u{00D9}', "\\`U"), // Ù
    ('\u{00DA}', "\\'U"), // Ú
    ('\u{00DB}', "\\^U"), // Û
    ('\u{00DC}', "\\\"U"), // Ü
    ('\u{00DD}', "\\'Y"), // Ý
    ('\u{00DE}', "\\TH"), // Þ
    ('\u{00DF}', "\\ss"), // ß
    ('\u{00E0}', "\\`a"), // à
    ('\u{00E1}', "\\'a"), // á
    ('\u{00E2}', "\\^a"), // â
    ('\u{00E3}', "\\~a"), // ã
    ('\u{00E4}', "\\\"a"), // ä
    ('\u{00E5}', "\\r a"), // å
    ('\u{00E6}', "\\ae"), // æ
    ('\u{00E7}', "\\c c"), // ç
    ('\u{00E8}', "\\`e"), // è
    ('\u{00E9}', "\\'e"), // é
    ('\u{00EA}', "\\^e"), // ê
    ('\u{00EB}', "\\\"e"), // ë
    ('\u{00EC}', "\\`\\i"), // ì
    ('\u{00ED}', "\\'\\i"), // í
    ('\u{00EE}', "\\^\\i"), // î
    ('\u{00EF}', "\\\"\\i"), // ï
    ('\u{00F0}', "\\dh"), // ð
    ('\u{00F1}', "\\~n"), // ñ
    ('\u{00F2}', "\\`o"), // ò
    ('\u{00F3}', "\\'o"), // ó
    ('\u{00F4}', "\\^o"), // ô
    ('\u{00F5}', "\\~o"), // õ
    ('\u{00F6}', "\\\"o"), // ö
    ('\u{00F7}', "\\textdiv"), // ÷
    ('\u{00F8}', "\\o"), // ø
    ('\u{00F9}', "\\`u"), // ù
    ('\u{00FA}', "\\'u"), // ú
    ('\u{00FB}', "\\^u"), // û
    ('\u{00FC}', "\\\"u"), // ü
    ('\u{00FD}', "\\'y"), // ý
    ('\u{00FE}', "\\th"), // þ
    ('\u{00FF}', "\\\"y"), // ÿ
    ('\u{0100}', "\\=A"), // Ā
    ('\u{0101}', "\\=a"), // ā
    ('\u{0102}', "\\u A"), // Ă
    ('\u{0103}', "\\u a"), // ă
    ('\u{0104}', "\\k A"), // Ą
    ('\u{0105}', "\\k a"), // ą
    ('\u{0106}', "\\'C"), // Ć
    ('\u{0107}', "\\'c"), // ć
    ('\u{0108}', "\\^C"), // Ĉ
    ('\u{0109}', "\\^c"), // ĉ
    ('\u{010A}', "\\.C"), // Ċ
    ('\u{010B}', "\\.c"), // ċ
    ('\u{010C}', "\\v C"), // Č
    ('\u{010D}', "\\v c"), // č
    ('\u{010E}', "\\v D"), // Ď
    ('\u{010F}', "\\v d"), // ď
    ('\u{0110}', "\\DJ"), // Đ
    ('\u{0111}', "\\dj"), // đ
    ('\u{0112}', "\\=E"), // Ē
    ('\u{0113}', "\\=e"), // ē
    ('\u{0114}', "\\u E"), // Ĕ
    ('\u{0115}', "\\u e"), // ĕ
    ('\u{0116}', "\\.E"), // Ė
    ('\u{0117}', "\\.e"), // ė
    ('\u{0118}', "\\k E"), // Ę
    ('\u{0119}', "\\k e"), // ę
    ('\u{011A}', "\\v E"), // Ě
    ('\u{011B}', "\\v e"), // ě
    ('\u{011C}', "\\^G"), // Ĝ
    ('\u{011D}', "\\^g"), // ĝ
    ('\u{011E}', "\\u G"), // Ğ
    ('\u{011F}', "\\u g"), // ğ
    ('\u{0120}', "\\.G"), // Ġ
    ('\u{0121}', "\\.g"), // ġ
    ('\u{0122}', "\\c G"), // Ģ
    ('\u{0123}', "\\c g"), // ģ
    ('\u{0124}', "\\^H"), // Ĥ
    ('\u{0125}', "\\^h"), // ĥ
    ('\u{0128}', "\\~I"), // Ĩ
    ('\u{0129}', "\\~\\i"), // ĩ
    ('\u{012A}', "\\=I"), // Ī
    ('\u{012B}', "\\=\\i"), // ī
    ('\u{012C}', "\\u I"), // Ĭ
    ('\u{012D}', "\\u\\i"), // ĭ
    ('\u{012E}', "\\k I"), // Į
    ('\u{012F}', "\\k i"), // į
    ('\u{0130}', "\\.I"), // İ
    ('\u{0131}', "\\i"), // ı
    ('\u{0132}', "\\IJ"), // Ĳ
    ('\u{0133}', "\\ij"), // ĳ
    ('\u{0134}', "\\^J"), // Ĵ
    ('\u{0135}', "\\^\\j"), // ĵ
    ('\u{0136}', "\\c K"), // Ķ
    ('\u{0137}', "\\c k"), // ķ
    ('\u{0139}', "\\'L"), // Ĺ
    ('\u{013A}', "\\'l"), // ĺ
    ('\u{013B}', "\\c L"), // Ļ
    ('\u{013C}', "\\c l"), // ļ
    ('\u{013D}', "\\v L"), // Ľ
    ('\u{013E}', "\\v l"), // ľ
    ('\u{0141}', "\\L"), // Ł
    ('\u{0142}', "\\l"), // ł
    ('\u{0143}', "\\'N"), // Ń
    ('\u{0144}', "\\'n"), // ń
    ('\u{0145}', "\\c N"), // Ņ
    ('\u{0146}', "\\c n"), // ņ
    ('\u{0147}', "\\v N"), // Ň
    ('\u{0148}', "\\v n"), // ň
    ('\u{014A}', "\\NG"), // Ŋ
    ('\u{014B}', "\\ng"), // ŋ
    ('\u{014C}', "\\=O"), // Ō
    ('\u{014D}', "\\=o"), // ō
    ('\u{014E}', "\\u O"), // Ŏ
    ('\u{014F}', "\\u o"), // ŏ
    ('\u{0150}', "\\H O"), // Ő
    ('\u{0151}', "\\H o"), // ő
    ('\u{0152}', "\\OE"), // Œ
    ('\u{0153}', "\\oe"), // œ
    ('\u{0154}', "\\'R"), // Ŕ
    ('\u{0155}', "\\'r"), // ŕ
    ('\u{0156}', "\\c R"), // Ŗ
    ('\u{0157}', "\\c r"), // ŗ
    ('\u{0158}', "\\v R"), // Ř
    ('\u{0159}', "\\v r"), // ř
    ('\u{015A}', "\\'S"), // Ś
    ('\u{015B}', "\\'s"), // ś
    ('\u{015C}', "\\^S"), // Ŝ
    ('\u{015D}', "\\^s"), // ŝ
    ('\u{015E}', "\\c S"), // Ş
    ('\u{015F}', "\\c s"), // ş
    ('\u{0160}', "\\v S"), // Š
    ('\u{0161}', "\\v s"), // š
    ('\u{0162}', "\\c T"), // Ţ
    ('\u{0163}', "\\c t"), // ţ
    ('\u{0164}', "\\v T"), // Ť
    ('\u{0165}', "\\v t"), // ť
    ('\u{0168}', "\\~U"), // Ũ
    ('\u{0169}', "\\~u"), // ũ
    ('\u{016A}', "\\=U"), // Ū
    ('\u{016B}', "\\=u"), // ū
    ('\u{016C}', "\\u U"), // Ŭ
    ('\u{016D}', "\\u u"), // ŭ
    ('\u{016E}', "\\r U"), // Ů
    ('\u{016F}', "\\r u"), // ů
    ('\u{0170}', "\\H U"), // Ű
    ('\u{0171}', "\\H u"), // ű
    ('\u{0172}', "\\k U"), // Ų
    ('\u{0173}', "\\k u"), // ų
    ('\u{0174}', "\\^W"), // Ŵ
    ('\u{0175}', "\\^w"), // ŵ
    ('\u{0176}', "\\^Y"), // Ŷ
    ('\u{0177}', "\\^y"), // ŷ
    ('\u{0178}', "\\\"Y"), // Ÿ
    ('\u{0179}', "\\'Z"), // Ź
    ('\u{017A}', "\\'z"), // ź
    ('\u{017B}', "\\.Z"), // Ż
    ('\u{017C}', "\\.z"), // ż
    ('\u{017D}', "\\v Z"), // Ž
    ('\u{017E}', "\\v z"), // ž
    ('\u{0237}', "\\j"), // ȷ
    ('\u{2013}', "\\textendash"), // –
    ('\u{2014}', "\\textemdash"), // —
    ('\u{2018}', "\\textquoteleft"), // ‘
    ('\u{2019}', "\\textquoteright"), // ’
    ('\u{201A}', "\\quotesinglbase"), // ‚
    ('\u{201C}', "\\textquotedblleft"), // “
    ('\u{201D}', "\\textquotedblright"), // ”
    ('\u{201E}', "\\quotedblbase"), // „
    ('\u{2020}', "\\dag"), // †
    ('\u{2021}', "\\ddag"), // ‡
    ('\u{2022}', "\\textbullet"), // •
    ('\u{2026}', "\\textellipsis"), // …
    ('\u{2030}', "\\textperthousand"), // ‰
    ('\u{2039}', "\\guilsinglleft"), // ‹
    ('\u{203A}', "\\guilsinglright"), // ›
    ('\u{20AC}', "\\texteuro"), // €
    ('\u{2122}', "\\texttrademark"), // ™
];

static DECODE: LazyLock<HashMap<char, &'static str>> =
    LazyLock::new(|| DECODE_PAIRS.iter().copied().collect());

static MACROS: LazyLock<MacroTable> = LazyLock::new(|| {
    let mut table = MacroTable::new();
    for (code_point, spelling) in DECODE_PAIRS.iter().copied() {
        define_spelling(&mut table, code_point, spelling);
    }
    log::debug!("built the LaTeX macro table with {} names", table.len());
    table
});

pub(crate) fn decode_table() -> &'static HashMap<char, &'static str> {
    &DECODE
}

/// The built-in macro table, the reverse direction of [`DECODE_PAIRS`].
pub fn macro_table() -> &'static MacroTable {
    &MACROS
}

/// Split a spelling into macro name and argument and add it to the table.
///
/// A spelling starting with a control symbol (`\'e`) puts everything after
/// the symbol in the argument; an alphabetic command takes its argument
/// after a separating space (`\c c`) or directly at a backslash (`\u\i`),
/// and defines a bare code point when neither follows (`\ss`).
fn define_spelling(table: &mut MacroTable, code_point: char, spelling: &str) {
    let rest = &spelling[1..];
    let Some(first) = rest.chars().next() else {
        return;
    };

    if !first.is_ascii_alphabetic() {
        let name = first.to_string();
        let arg = &rest[first.len_utf8()..];
        if arg.is_empty() {
            table.define(name, code_point);
        } else {
            table.define_arg(name, arg, code_point);
        }
        return;
    }

    match rest.find([' ', '\\']) {
        None => table.define(rest, code_point),
        Some(idx) => {
            let (name, tail) = rest.split_at(idx);
            let arg = tail.strip_prefix(' ').unwrap_or(tail);
            table.define_arg(name, arg, code_point);
        }
    }
}
