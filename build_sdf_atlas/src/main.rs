//! This binary crate provides a CLI utility for rendering a set of characters from a TrueType
//! font into a signed distance field atlas. It is a thin frontend to `sdf_atlas_tools`; see
//! `sdf_glyph_renderer` for the technical details of how each glyph is rendered.
//!
//! ## Usage
//!
//! The font and characters come from a settings file, either JSON
//! (`{"font_path": "...", "characters": "..."}`) or a plain text file holding the font path
//! followed by the characters, separated by whitespace. `--font` and `--chars` override the
//! file, and when both are given no settings file is read at all.
//!
//! Two files are written next to each other: `<out>.sdfb`, the binary atlas asset, and
//! `<out>.bmp`, an uncompressed bitmap of the atlas for inspection. **Existing files are
//! overwritten.**
//!
//! ```
//! $ build_sdf_atlas --font /path/to/font.ttf --chars "ABCabc" --out atlas
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    process,
    time::Instant,
};

use clap::{command, crate_authors, crate_description, crate_version, value_parser, Arg, ArgMatches};
use sdf_atlas_tools::{
    bmp::save_bmp, decode_utf8, generate_atlas, AtlasError, AtlasOptions, Font, Settings,
};

fn cli() -> clap::Command {
    command!()
        .author(crate_authors!())
        .version(crate_version!())
        .before_help(crate_description!())
        .arg(Arg::new("SETTINGS")
            .help("Path to the settings file naming the font and the characters to render. Files ending in .json are read as JSON; anything else as a font path followed by the characters")
            .long("settings")
            .value_name("FILE")
            .value_parser(value_parser!(PathBuf))
            .default_value("FontSDFSettings.txt"))
        .arg(Arg::new("FONT")
            .help("The TrueType font to render, overriding the settings file")
            .long("font")
            .value_name("FONT")
            .value_parser(value_parser!(PathBuf)))
        .arg(Arg::new("CHARS")
            .help("The characters to render, in atlas order, overriding the settings file")
            .long("chars")
            .value_name("CHARS"))
        .arg(Arg::new("OUT")
            .help("Output path prefix; the atlas is written to <OUT>.sdfb and <OUT>.bmp")
            .long("out")
            .value_name("PREFIX")
            .default_value("atlas_super"))
        .arg(Arg::new("PIXEL_SIZE")
            .help("Size in px of each glyph inside its tile")
            .long("pixel-size")
            .value_parser(value_parser!(u32).range(1..)))
        .arg(Arg::new("BORDER")
            .help("Padding in px around each glyph")
            .long("border")
            .value_parser(value_parser!(u32)))
        .arg(Arg::new("SPREAD")
            .help("Distance field radius in px")
            .long("spread")
            .value_parser(value_parser!(u32).range(1..)))
        .arg(Arg::new("SUPERSAMPLE")
            .help("Supersampling factor for glyph coverage; must be a multiple of 4")
            .long("supersample")
            .value_parser(value_parser!(u32).range(4..)))
        .arg(Arg::new("ATLAS_WIDTH")
            .help("Width of the atlas in px")
            .long("atlas-width")
            .value_parser(value_parser!(usize)))
        .arg(Arg::new("THREADS")
            .help("Number of worker threads (defaults to the number of logical CPUs)")
            .long("threads")
            .value_parser(value_parser!(usize)))
}

/// Merges the settings file with any overrides given on the command line.
fn resolve_settings(matches: &ArgMatches) -> Result<Settings, AtlasError> {
    let font = matches.get_one::<PathBuf>("FONT");
    let chars = matches.get_one::<String>("CHARS");
    if let (Some(font_path), Some(characters)) = (font, chars) {
        return Ok(Settings {
            font_path: font_path.clone(),
            characters: characters.clone(),
        });
    }

    let path = matches
        .get_one::<PathBuf>("SETTINGS")
        .map_or_else(|| Path::new("FontSDFSettings.txt"), PathBuf::as_path);
    let mut settings = Settings::load(path)?;
    if let Some(font_path) = font {
        settings.font_path = font_path.clone();
    }
    if let Some(characters) = chars {
        settings.characters = characters.clone();
    }
    Ok(settings)
}

fn options(matches: &ArgMatches) -> AtlasOptions {
    let mut options = AtlasOptions::default();
    let params = &mut options.params;
    let overrides = [
        ("PIXEL_SIZE", &mut params.pixel_size),
        ("BORDER", &mut params.border),
        ("SPREAD", &mut params.spread),
        ("SUPERSAMPLE", &mut params.supersample),
    ];
    for (id, value) in overrides {
        if let Some(v) = matches.get_one::<u32>(id) {
            *value = *v;
        }
    }
    if let Some(width) = matches.get_one::<usize>("ATLAS_WIDTH") {
        options.atlas_width = *width;
    }
    options.threads = Some(
        matches
            .get_one::<usize>("THREADS")
            .copied()
            .unwrap_or_else(num_cpus::get),
    );
    options
}

fn run(matches: &ArgMatches) -> Result<(), AtlasError> {
    let settings = resolve_settings(matches)?;
    let options = options(matches);
    let out = matches
        .get_one::<String>("OUT")
        .map_or("atlas_super", String::as_str);

    log::info!("Loading {}", settings.font_path.display());
    let blob = fs::read(&settings.font_path)?;
    let font = Font::new(&blob);
    let code_points = decode_utf8(settings.characters.as_bytes());

    log::info!(
        "Rendering {} character(s) on {} worker thread(s)...",
        code_points.len(),
        options.threads.unwrap_or(1)
    );
    let render_start = Instant::now();
    let asset = generate_atlas(&font, &code_points, &options)?;
    let render_duration = render_start.elapsed();

    let total_glyphs_rendered = asset.records.iter().filter(|r| !r.is_missing()).count();
    if total_glyphs_rendered > 0 {
        let duration_per_glyph = render_duration / total_glyphs_rendered as u32;
        log::info!(
            "Rendered {total_glyphs_rendered} glyph(s) in {render_duration:?} ({duration_per_glyph:?}/glyph)"
        );
    }

    let bmp_path = PathBuf::from(format!("{out}.bmp"));
    save_bmp(&bmp_path, asset.width(), asset.height(), &asset.pixels)?;
    log::info!(
        "Saved {} ({}x{})",
        bmp_path.display(),
        asset.width(),
        asset.height()
    );

    let asset_path = PathBuf::from(format!("{out}.sdfb"));
    asset.save(&asset_path)?;
    log::info!(
        "Saved {} ({} glyphs)",
        asset_path.display(),
        asset.records.len()
    );

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = cli().get_matches();
    if let Err(e) = run(&matches) {
        log::error!("{e}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{cli, options};

    #[test]
    fn test_cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn test_option_overrides() {
        let matches = cli()
            .try_get_matches_from([
                "build_sdf_atlas",
                "--pixel-size",
                "32",
                "--supersample",
                "16",
                "--atlas-width",
                "512",
                "--threads",
                "3",
            ])
            .unwrap();
        let options = options(&matches);
        assert_eq!(options.params.pixel_size, 32);
        assert_eq!(options.params.supersample, 16);
        assert_eq!(options.params.border, 4);
        assert_eq!(options.atlas_width, 512);
        assert_eq!(options.threads, Some(3));
    }
}
