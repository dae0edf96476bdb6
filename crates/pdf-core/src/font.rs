//! Font handling for PDF documents
//!
//! Two kinds of fonts are supported:
//! - the standard PDF fonts Helvetica and ZapfDingbats, which every viewer
//!   ships and which need no embedding (widths come from the Adobe AFM files)
//! - TrueType fonts supplied by the caller, embedded whole as a CID font

use crate::{PdfError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{BTreeSet, HashMap};

/// Helvetica advance widths for WinAnsi codes 32..=126 (1/1000 em)
const HELVETICA_ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A..M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N..Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a..m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n..z
    334, 260, 334, 584, // {..~
];

/// Helvetica advance widths for Latin-1 codes 0xA0..=0xFF (1/1000 em)
const HELVETICA_LATIN1_WIDTHS: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // A0..AF
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // B0..BF
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // C0..CF
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // D0..DF
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // E0..EF
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // F0..FF
];

/// A font resource usable on a composed page
#[derive(Debug, Clone)]
pub enum PageFont {
    /// One of the standard PDF fonts (no embedding)
    Standard(StandardFont),
    /// An embedded TrueType font
    TrueType(FontData),
}

impl PageFont {
    /// Helvetica, the default text font
    pub fn helvetica() -> Self {
        PageFont::Standard(StandardFont::Helvetica)
    }

    /// Load a TrueType font from bytes
    pub fn truetype(name: &str, ttf_data: &[u8]) -> Result<Self> {
        Ok(PageFont::TrueType(FontData::from_ttf(name, ttf_data)?))
    }

    /// Check if the font can draw the character
    pub fn has_glyph(&self, c: char) -> bool {
        match self {
            PageFont::Standard(font) => font.encode_char(c).is_some(),
            PageFont::TrueType(font) => font.has_glyph(c),
        }
    }

    /// Width of `text` in points at `font_size`
    pub fn text_width(&self, text: &str, font_size: f64) -> f64 {
        match self {
            PageFont::Standard(font) => {
                let units: u32 = text.chars().map(|c| font.char_width(c) as u32).sum();
                units as f64 / 1000.0 * font_size
            }
            PageFont::TrueType(font) => font.text_width_points(text, font_size),
        }
    }

    /// Width of one character in points at `font_size`
    pub fn char_width(&self, c: char, font_size: f64) -> f64 {
        match self {
            PageFont::Standard(font) => font.char_width(c) as f64 / 1000.0 * font_size,
            PageFont::TrueType(font) => {
                font.advance(c) as f64 / font.units_per_em() as f64 * font_size
            }
        }
    }

    /// Ascent above the baseline in points
    pub fn ascent(&self, font_size: f64) -> f64 {
        match self {
            PageFont::Standard(font) => font.ascent() as f64 / 1000.0 * font_size,
            PageFont::TrueType(font) => {
                font.ascender() as f64 / font.units_per_em() as f64 * font_size
            }
        }
    }

    /// Descent below the baseline in points (positive number)
    pub fn descent(&self, font_size: f64) -> f64 {
        match self {
            PageFont::Standard(font) => -(font.descent() as f64) / 1000.0 * font_size,
            PageFont::TrueType(font) => {
                -(font.descender() as f64) / font.units_per_em() as f64 * font_size
            }
        }
    }

    /// Natural height of one line of text (ascent + descent)
    pub fn text_height(&self, font_size: f64) -> f64 {
        self.ascent(font_size) + self.descent(font_size)
    }

    /// Encode text as a hex string for the Tj operator
    pub fn encode_hex(&self, text: &str) -> String {
        match self {
            PageFont::Standard(font) => font.encode_text_hex(text),
            PageFont::TrueType(font) => font.encode_text_hex(text),
        }
    }

    /// Add the font objects to `doc` and return the font dictionary id
    pub(crate) fn embed(&self, doc: &mut Document, used_chars: &BTreeSet<char>) -> ObjectId {
        match self {
            PageFont::Standard(font) => doc.add_object(font.to_pdf_dictionary()),
            PageFont::TrueType(font) => font.embed(doc, used_chars),
        }
    }
}

impl Default for PageFont {
    fn default() -> Self {
        Self::helvetica()
    }
}

/// Standard PDF fonts known to every viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    ZapfDingbats,
}

impl StandardFont {
    /// PostScript base font name
    pub fn base_name(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::ZapfDingbats => "ZapfDingbats",
        }
    }

    /// Single-byte code for a character, if the font can draw it
    pub fn encode_char(&self, c: char) -> Option<u8> {
        match self {
            StandardFont::Helvetica => win_ansi_code(c),
            StandardFont::ZapfDingbats => dingbat_code(c),
        }
    }

    /// Advance width in 1/1000 em
    pub fn char_width(&self, c: char) -> u16 {
        match self {
            StandardFont::Helvetica => match win_ansi_code(c) {
                Some(code @ 32..=126) => HELVETICA_ASCII_WIDTHS[(code - 32) as usize],
                Some(code) => helvetica_high_width(code),
                None => 0,
            },
            StandardFont::ZapfDingbats => match dingbat_code(c) {
                Some(0x33) => 755,
                Some(0x34) => 846,
                Some(0x35) => 762,
                Some(0x36) => 761,
                Some(0x37) => 571,
                Some(0x38) => 677,
                Some(0x6C) => 791,
                _ => 0,
            },
        }
    }

    pub fn ascent(&self) -> i16 {
        match self {
            StandardFont::Helvetica => 718,
            StandardFont::ZapfDingbats => 820,
        }
    }

    pub fn descent(&self) -> i16 {
        match self {
            StandardFont::Helvetica => -207,
            StandardFont::ZapfDingbats => -143,
        }
    }

    /// Encode text as `<hex>`; characters the font lacks are skipped
    pub fn encode_text_hex(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len() * 2 + 2);
        result.push('<');
        for code in text.chars().filter_map(|c| self.encode_char(c)) {
            result.push_str(&format!("{code:02X}"));
        }
        result.push('>');
        result
    }

    fn to_pdf_dictionary(self) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"Font".to_vec()));
        dict.set("Subtype", Object::Name(b"Type1".to_vec()));
        dict.set(
            "BaseFont",
            Object::Name(self.base_name().as_bytes().to_vec()),
        );
        if self == StandardFont::Helvetica {
            dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        }
        dict
    }
}

/// Map a character to its WinAnsiEncoding code
fn win_ansi_code(c: char) -> Option<u8> {
    match c {
        ' '..='~' => Some(c as u8),
        '\u{00A0}'..='\u{00FF}' => Some(c as u32 as u8),
        '€' => Some(0x80),
        '‚' => Some(0x82),
        '„' => Some(0x84),
        '…' => Some(0x85),
        '‘' => Some(0x91),
        '’' => Some(0x92),
        '“' => Some(0x93),
        '”' => Some(0x94),
        '•' => Some(0x95),
        '–' => Some(0x96),
        '—' => Some(0x97),
        '™' => Some(0x99),
        _ => None,
    }
}

/// Helvetica widths outside printable ASCII
fn helvetica_high_width(code: u8) -> u16 {
    match code {
        0xA0..=0xFF => HELVETICA_LATIN1_WIDTHS[(code - 0xA0) as usize],
        0x85 | 0x97 | 0x99 => 1000,
        0x91 | 0x92 | 0x82 => 222,
        0x93 | 0x94 | 0x84 => 333,
        0x95 => 350,
        _ => 556,
    }
}

/// Map a character to its ZapfDingbats code
fn dingbat_code(c: char) -> Option<u8> {
    match c {
        '✓' => Some(0x33),
        '✔' => Some(0x34),
        '✕' => Some(0x35),
        '✖' => Some(0x36),
        '✗' => Some(0x37),
        '✘' => Some(0x38),
        '●' => Some(0x6C),
        _ => None,
    }
}

/// Glyph id and advance width (font units) of one mapped character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Glyph {
    id: u16,
    advance: u16,
}

/// Font data structure for embedded TrueType fonts
///
/// The face is parsed once on load; the metrics and the character map
/// needed for layout are kept alongside the raw bytes.
#[derive(Debug, Clone)]
pub struct FontData {
    /// Font name/identifier
    pub name: String,
    /// Raw TTF data
    ttf_data: Vec<u8>,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    glyphs: HashMap<char, Glyph>,
}

impl FontData {
    /// Create font data from TTF bytes
    ///
    /// # Arguments
    /// * `name` - Font identifier (used as the PDF BaseFont)
    /// * `ttf_data` - TrueType font file bytes
    pub fn from_ttf(name: &str, ttf_data: &[u8]) -> Result<Self> {
        let face = ttf_parser::Face::parse(ttf_data, 0)
            .map_err(|e| PdfError::FontParseError(format!("{e:?}")))?;

        let mut glyphs = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|code| {
                    let Some(c) = char::from_u32(code) else {
                        return;
                    };
                    if let Some(id) = face.glyph_index(c).filter(|id| id.0 != 0) {
                        glyphs.entry(c).or_insert(Glyph {
                            id: id.0,
                            advance: face.glyph_hor_advance(id).unwrap_or(0),
                        });
                    }
                });
            }
        }

        Ok(Self {
            name: name.to_string(),
            ttf_data: ttf_data.to_vec(),
            units_per_em: face.units_per_em(),
            ascender: face.ascender(),
            descender: face.descender(),
            glyphs,
        })
    }

    /// Get glyph ID for a character
    pub fn glyph_id(&self, c: char) -> Option<u16> {
        self.glyphs.get(&c).map(|glyph| glyph.id)
    }

    /// Check if font has a glyph for the given character
    pub fn has_glyph(&self, c: char) -> bool {
        self.glyphs.contains_key(&c)
    }

    /// Advance width of one character in font units (0 when unmapped)
    pub fn advance(&self, c: char) -> u16 {
        self.glyphs.get(&c).map(|glyph| glyph.advance).unwrap_or(0)
    }

    /// Get font units per em
    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// Get font ascender
    pub fn ascender(&self) -> i16 {
        self.ascender
    }

    /// Get font descender
    pub fn descender(&self) -> i16 {
        self.descender
    }

    /// Calculate text width in font units
    pub fn text_width(&self, text: &str) -> u32 {
        text.chars().map(|c| self.advance(c) as u32).sum()
    }

    /// Calculate text width in points for a given font size
    pub fn text_width_points(&self, text: &str, font_size: f64) -> f64 {
        self.text_width(text) as f64 / self.units_per_em() as f64 * font_size
    }

    /// Encode text as hex glyph IDs for an Identity-H font
    pub fn encode_text_hex(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len() * 4 + 2);
        result.push('<');
        for c in text.chars() {
            let gid = self.glyph_id(c).unwrap_or(0);
            result.push_str(&format!("{gid:04X}"));
        }
        result.push('>');
        result
    }

    /// Add Type0 + CIDFontType2 + descriptor + font file + ToUnicode objects
    fn embed(&self, doc: &mut Document, used_chars: &BTreeSet<char>) -> ObjectId {
        let font_name = Object::Name(self.name.clone().into_bytes());

        let font_file_id = doc.add_object(Stream::new(
            Dictionary::from_iter(vec![("Length1", (self.ttf_data.len() as i64).into())]),
            self.ttf_data.clone(),
        ));

        let units_per_em = self.units_per_em() as f64;
        let to_pdf_units = |v: i16| ((v as f64) * 1000.0 / units_per_em).round() as i64;
        let ascent = to_pdf_units(self.ascender());
        let descent = to_pdf_units(self.descender());

        let font_descriptor_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"FontDescriptor".to_vec())),
            ("FontName", font_name.clone()),
            ("Flags", 4.into()),
            (
                "FontBBox",
                vec![0.into(), descent.into(), 1000.into(), ascent.into()].into(),
            ),
            ("ItalicAngle", 0.into()),
            ("Ascent", ascent.into()),
            ("Descent", descent.into()),
            ("CapHeight", ascent.into()),
            ("StemV", 80.into()),
            ("FontFile2", Object::Reference(font_file_id)),
        ]));

        let cid_system_info = Dictionary::from_iter(vec![
            ("Registry", Object::string_literal("Adobe")),
            ("Ordering", Object::string_literal("Identity")),
            ("Supplement", 0.into()),
        ]);

        let cid_font_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"CIDFontType2".to_vec())),
            ("BaseFont", font_name.clone()),
            ("CIDSystemInfo", cid_system_info.into()),
            ("FontDescriptor", Object::Reference(font_descriptor_id)),
            ("CIDToGIDMap", Object::Name(b"Identity".to_vec())),
            ("W", self.generate_widths_array(used_chars).into()),
            ("DW", 1000.into()),
        ]));

        let tounicode = self.generate_tounicode_cmap(used_chars);
        let tounicode_id = doc.add_object(Stream::new(Dictionary::new(), tounicode.into_bytes()));

        doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type0".to_vec())),
            ("BaseFont", font_name),
            ("Encoding", Object::Name(b"Identity-H".to_vec())),
            (
                "DescendantFonts",
                vec![Object::Reference(cid_font_id)].into(),
            ),
            ("ToUnicode", Object::Reference(tounicode_id)),
        ]))
    }

    /// Generate /W array for glyph widths: [gid1 [w1] gid2 [w2] ...]
    fn generate_widths_array(&self, used_chars: &BTreeSet<char>) -> Vec<Object> {
        let units_per_em = self.units_per_em as f64;

        let glyphs: BTreeSet<(u16, u16)> = used_chars
            .iter()
            .filter_map(|c| self.glyphs.get(c))
            .map(|glyph| (glyph.id, glyph.advance))
            .collect();

        let mut widths = Vec::with_capacity(glyphs.len() * 2);
        for (gid, advance) in glyphs {
            let width = (advance as f64 * 1000.0 / units_per_em).round() as i64;
            widths.push((gid as i64).into());
            widths.push(vec![width.into()].into());
        }

        widths
    }

    /// Generate ToUnicode CMap stream content
    fn generate_tounicode_cmap(&self, used_chars: &BTreeSet<char>) -> String {
        let mut cmap = String::new();

        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        cmap.push_str("/CMapName /Adobe-Identity-UCS def\n");
        cmap.push_str("/CMapType 2 def\n");
        cmap.push_str("1 begincodespacerange\n");
        cmap.push_str("<0000> <FFFF>\n");
        cmap.push_str("endcodespacerange\n");

        let chars: Vec<char> = used_chars.iter().copied().collect();
        // bfchar sections are limited to 100 entries each
        for chunk in chars.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for c in chunk {
                let gid = self.glyph_id(*c).unwrap_or(0);
                let mut utf16 = [0u16; 2];
                let unicode: String = c
                    .encode_utf16(&mut utf16)
                    .iter()
                    .map(|unit| format!("{unit:04X}"))
                    .collect();
                cmap.push_str(&format!("<{gid:04X}> <{unicode}>\n"));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\n");
        cmap.push_str("end\n");

        cmap
    }
}
