use {
    pixmap::Pixmap,
    std::io::{self, Write},
};

/// Array elements per line.
const LINE: usize = 12;
const INDENT: &str = "    ";

pub fn guard_name(symbol: &str) -> String {
    format!("MKSDLSFC_{}_SURFACE", symbol.to_ascii_uppercase())
}

pub fn write_header<W: Write>(out: &mut W, symbol: &str) -> io::Result<()> {
    let guard = guard_name(symbol);
    writeln!(out, "#ifndef {guard}")?;
    writeln!(out, "#define {guard}")?;
    writeln!(out)?;
    writeln!(out, "#include <SDL2/SDL.h>")?;
    writeln!(out)?;
    writeln!(out, "SDL_Surface *{symbol}_surface();")?;
    writeln!(out)?;
    writeln!(out, "#endif")?;
    Ok(())
}

/// Writes `bytes` as comma separated C hex literals, [`LINE`] to a line. Every
/// line, the first included, starts with a newline and an indent.
pub fn write_bytes<W: Write>(out: &mut W, bytes: &[u8]) -> io::Result<()> {
    for (i, byte) in bytes.iter().enumerate() {
        if i != 0 {out.write_all(b",")?}
        if i % LINE == 0 {write!(out, "\n{INDENT}")?}
        else             {out.write_all(b" ")?}
        write!(out, "0x{byte:02x}")?;
    }
    Ok(())
}

pub fn write_implementation<W: Write>(out: &mut W, pixmap: &Pixmap, symbol: &str)
    -> io::Result<()>
{
    writeln!(out, "#include <SDL2/SDL.h>")?;
    writeln!(out)?;

    write!(out, "static unsigned char {symbol}_pixels[] = {{")?;
    write_bytes(out, pixmap.as_bytes())?;
    writeln!(out)?;
    writeln!(out, "}};")?;
    writeln!(out)?;

    let (wide, high) = (pixmap.wide(), pixmap.high());
    let (bpp, pitch) = (pixmap.bits_per_pixel(), pixmap.pitch());
    let format = pixmap.format().name();
    writeln!(out, "SDL_Surface *{symbol}_surface()")?;
    writeln!(out, "{{")?;
    writeln!(out, "{INDENT}return SDL_CreateRGBSurfaceWithFormatFrom(")?;
    writeln!(out, "{INDENT}{INDENT}{INDENT}{symbol}_pixels, {wide}, {high},")?;
    writeln!(out, "{INDENT}{INDENT}{INDENT}{bpp}, {pitch}, {format});")?;
    writeln!(out, "}}")?;
    Ok(())
}
