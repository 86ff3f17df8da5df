//! Chunk rendering: one asset -> one C++ literal with provenance comment.
//!
//! Chunks are bytes: generated C++ is UTF-8, plaintext bodies are written
//! back one byte per char.

use std::fs;
use std::path::Path;

use super::context::RenderContext;
use super::error::{PackError, Result};
use super::filter::{self, FilterOptions};
use super::spec::{AssetSpec, Method};
use super::text;

/// Bytes per line in hex dumps.
const BYTES_PER_LINE: usize = 16;

/// Everything a chunk render needs besides the asset itself.
#[derive(Debug, Clone, Copy)]
pub struct ChunkEnv<'a> {
    /// Directory asset files are relative to
    pub source_dir: &'a Path,
    /// How `source_dir` is shown in provenance comments
    pub label_dir: &'a str,
    pub context: &'a RenderContext,
    pub filters: &'a FilterOptions,
}

impl ChunkEnv<'_> {
    /// `<label_dir>/<file>` with forward slashes.
    pub fn label(&self, spec: &AssetSpec) -> String {
        let file = spec.file.to_string_lossy().replace('\\', "/");
        if self.label_dir.is_empty() {
            file
        } else {
            format!("{}/{}", self.label_dir.trim_end_matches('/'), file)
        }
    }
}

/// Render one spec, dispatching on its method.
pub fn render(spec: &AssetSpec, env: &ChunkEnv<'_>) -> Result<Vec<u8>> {
    let path = env.source_dir.join(&spec.file);
    let bytes = fs::read(&path).map_err(|e| PackError::Read(path.clone(), e))?;
    let label = env.label(spec);

    let chunk = match spec.method {
        Method::Plaintext => render_plaintext(spec, &bytes, &label, env)?,
        Method::Binary => render_binary(spec, &bytes, &label)?,
    };
    Ok(match &spec.guard {
        Some(token) => guarded(spec, token, chunk),
        None => chunk,
    })
}

/// filter -> substitute -> mangle -> wrap in a raw string literal.
fn render_plaintext(
    spec: &AssetSpec,
    bytes: &[u8],
    label: &str,
    env: &ChunkEnv<'_>,
) -> Result<Vec<u8>> {
    let source = text::decode(bytes);
    let filtered = filter::apply(&source, spec.filter.as_ref(), env.filters)?;
    let substituted = env.context.apply(&filtered);
    let body = match spec.mangle {
        Some(mangle) => mangle(&substituted),
        None => substituted,
    };
    let body = text::encode(&body);
    let literal = plaintext_literal(&spec.name, &spec.prepend, &body, &spec.append);
    Ok(framed(label, &literal))
}

fn render_binary(spec: &AssetSpec, bytes: &[u8], label: &str) -> Result<Vec<u8>> {
    let literal = binary_literal(&spec.name, "_length", bytes)?;
    Ok(framed(label, literal.as_bytes()))
}

/// Provenance comment, then the literal, with blank lines around.
fn framed(label: &str, literal: &[u8]) -> Vec<u8> {
    let mut out = format!("\n{}\n", provenance(label)).into_bytes();
    out.extend_from_slice(literal);
    out.extend_from_slice(b"\n\n");
    out
}

/// `#ifdef TOKEN` around the chunk, with an empty literal otherwise.
fn guarded(spec: &AssetSpec, token: &str, chunk: Vec<u8>) -> Vec<u8> {
    let fallback = match spec.method {
        Method::Plaintext => plaintext_literal(&spec.name, &spec.prepend, b"", &spec.append),
        Method::Binary => format!(
            "const uint16_t {name}_length = 0;\nconst uint8_t {name}[] PROGMEM = {{ 0 }};",
            name = spec.name
        )
        .into_bytes(),
    };
    let mut out = format!("\n#ifdef {token}").into_bytes();
    out.extend(chunk);
    out.extend_from_slice(b"#else\n");
    out.extend(fallback);
    out.extend_from_slice(b"\n#endif\n");
    out
}

/// Comment naming the source a literal was generated from.
pub fn provenance(label: &str) -> String {
    format!("// Autogenerated from {label}, do not edit!!")
}

/// Raw string literal around an already encoded `body`.
pub fn plaintext_literal(name: &str, prepend: &str, body: &[u8], append: &str) -> Vec<u8> {
    let mut out = format!("const char {name}[] PROGMEM = R\"{prepend}").into_bytes();
    out.extend_from_slice(body);
    out.extend_from_slice(format!("{append}\";").as_bytes());
    out
}

/// Length constant plus byte array; `len_suffix` is appended to `name`
/// for the length symbol.
pub fn binary_literal(name: &str, len_suffix: &str, bytes: &[u8]) -> Result<String> {
    if u16::try_from(bytes.len()).is_err() {
        return Err(PackError::TooLarge {
            name: name.to_string(),
            len: bytes.len(),
        });
    }
    Ok(format!(
        "const uint16_t {name}{len_suffix} = {len};\nconst uint8_t {name}[] PROGMEM = {{\n{dump}\n}};",
        len = bytes.len(),
        dump = hexdump(bytes)
    ))
}

/// `0x%02x` bytes, 16 per line, each line indented two spaces.
pub fn hexdump(bytes: &[u8]) -> String {
    bytes
        .chunks(BYTES_PER_LINE)
        .map(|block| {
            let hex: Vec<String> = block.iter().map(|b| format!("0x{b:02x}")).collect();
            format!("  {}", hex.join(", "))
        })
        .collect::<Vec<_>>()
        .join(",\n")
}

/// Parse the bytes back out of a generated array body.
#[cfg(test)]
pub fn parse_hexdump(source: &str) -> Vec<u8> {
    let start = source.find('{').map_or(0, |i| i + 1);
    let end = source.rfind('}').unwrap_or(source.len());
    source[start..end]
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| u8::from_str_radix(s.trim_start_matches("0x"), 16).unwrap())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn env<'a>(
        dir: &'a Path,
        context: &'a RenderContext,
        filters: &'a FilterOptions,
    ) -> ChunkEnv<'a> {
        ChunkEnv {
            source_dir: dir,
            label_dir: "wled00/data",
            context,
            filters,
        }
    }

    fn render_text(spec: &AssetSpec, env: &ChunkEnv<'_>) -> String {
        String::from_utf8(render(spec, env).unwrap()).unwrap()
    }

    #[test]
    fn test_hexdump_layout() {
        let bytes: Vec<u8> = (0..18).collect();
        let dump = hexdump(&bytes);
        let lines: Vec<_> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  0x00, 0x01,"));
        assert!(lines[0].ends_with("0x0f,"));
        assert_eq!(lines[1], "  0x10, 0x11");
        assert_eq!(hexdump(&[]), "");
    }

    #[test]
    fn test_binary_length_matches_source() {
        let dir = TempDir::new().unwrap();
        let icon: Vec<u8> = (0..=255u8).cycle().take(1150).collect();
        fs::write(dir.path().join("favicon.ico"), &icon).unwrap();

        let (ctx, filters) = (RenderContext::default(), FilterOptions::default());
        let spec = AssetSpec::binary("favicon.ico", "favicon");
        let chunk = render_text(&spec, &env(dir.path(), &ctx, &filters));

        assert!(chunk.contains("// Autogenerated from wled00/data/favicon.ico, do not edit!!"));
        assert!(chunk.contains("const uint16_t favicon_length = 1150;"));
        assert_eq!(parse_hexdump(&chunk), icon);
    }

    #[test]
    fn test_plaintext_without_filter_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let source = "<p>\n  50% Grün  ##VERSION##\n</p>\n";
        fs::write(dir.path().join("msg.htm"), source).unwrap();

        let ctx = RenderContext::new(Some("1.2.3".into()), None);
        let filters = FilterOptions::default();
        let spec = AssetSpec::plaintext("msg.htm", "PAGE_msg").wrap("=====(", ")=====");
        let chunk = render(&spec, &env(dir.path(), &ctx, &filters)).unwrap();

        let expected = format!(
            "\n// Autogenerated from wled00/data/msg.htm, do not edit!!\nconst char PAGE_msg[] PROGMEM = R\"=====({})=====\";\n\n",
            source.replace("##VERSION##", "1.2.3")
        );
        assert_eq!(chunk, expected.as_bytes());
    }

    #[test]
    fn test_mangle_runs_after_substitution() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("style.css"), ".a{width:100%}/*##VERSION##*/").unwrap();

        let ctx = RenderContext::new(Some("9.9".into()), None);
        let filters = FilterOptions::default();
        let spec = AssetSpec::plaintext("style.css", "PAGE_settingsCss")
            .wrap("=====(<style>", "</style>)=====")
            .mangle(|s| s.replace('%', "%%"));
        let chunk = render_text(&spec, &env(dir.path(), &ctx, &filters));

        assert!(chunk.contains("R\"=====(<style>.a{width:100%%}/*9.9*/</style>)=====\";"));
    }

    #[test]
    fn test_guarded_chunk() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("dmxmap.htm"), "<p>map</p>").unwrap();

        let (ctx, filters) = (RenderContext::default(), FilterOptions::default());
        let spec = AssetSpec::plaintext("dmxmap.htm", "PAGE_dmxmap")
            .wrap("=====(", ")=====")
            .guard("WLED_ENABLE_DMX");
        let chunk = render_text(&spec, &env(dir.path(), &ctx, &filters));

        let ifdef = chunk.find("#ifdef WLED_ENABLE_DMX").unwrap();
        let full = chunk.find("R\"=====(<p>map</p>)=====\"").unwrap();
        let other = chunk.find("#else\nconst char PAGE_dmxmap[] PROGMEM = R\"=====()=====\";").unwrap();
        let endif = chunk.find("#endif").unwrap();
        assert!(ifdef < full && full < other && other < endif);
    }

    #[test]
    fn test_non_ascii_label_stays_utf8() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("grün.htm"), "<p>Grün</p>").unwrap();

        let (ctx, filters) = (RenderContext::default(), FilterOptions::default());
        let env = ChunkEnv {
            label_dir: "wled00/dätä",
            ..env(dir.path(), &ctx, &filters)
        };
        let spec = AssetSpec::plaintext("grün.htm", "PAGE_gruen").wrap("=====(", ")=====");
        let chunk = render_text(&spec, &env);

        assert!(chunk.contains("// Autogenerated from wled00/dätä/grün.htm, do not edit!!"));
        assert!(chunk.contains("R\"=====(<p>Grün</p>)=====\";"));
    }

    #[test]
    fn test_missing_source() {
        let dir = TempDir::new().unwrap();
        let (ctx, filters) = (RenderContext::default(), FilterOptions::default());
        let spec = AssetSpec::plaintext("nope.htm", "PAGE_nope");
        assert!(matches!(
            render(&spec, &env(dir.path(), &ctx, &filters)),
            Err(PackError::Read(..))
        ));
    }

    #[test]
    fn test_binary_too_large() {
        let bytes = vec![0u8; 70_000];
        assert!(matches!(
            binary_literal("PAGE_big", "_L", &bytes),
            Err(PackError::TooLarge { len: 70_000, .. })
        ));
    }
}
