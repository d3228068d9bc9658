use {
    crate::rates::{self, Fallback, RateSource},
    anyhow::{Context as _, Result as Anyhow},
    camino::{Utf8Path as Path, Utf8PathBuf as PathBuf},
    rayon::prelude::*,
    std::io::Write as _,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub bd_path: PathBuf,
    /// When unset, a `.hd` next to the bank is used if there is one.
    pub hd_path: Option<PathBuf>,
    /// Rate for every clip, bypassing the header.
    pub rate: Option<u32>,
    pub default_rate: u32,
    /// Defaults to a directory named after the bank, beside it.
    pub out_dir: Option<PathBuf>,
}

impl Config {
    pub fn new(bd_path: impl Into<PathBuf>) -> Self {
        Config {
            bd_path: bd_path.into(),
            hd_path: None,
            rate: None,
            default_rate: rates::DEFAULT_RATE,
            out_dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Clip<'a> {
    pub index: usize,
    /// Number of clips in the bank.
    pub of: usize,
    pub pcm: &'a [i16],
    pub rate: u32,
}

impl Clip<'_> {
    pub fn file_name(&self) -> String {
        let width = self.of.to_string().len();
        format!("{:0width$}.wav", self.index)
    }
}

#[derive(Debug, Clone)]
pub struct Summary {
    pub clips: usize,
    pub out_dir: PathBuf,
}

/// Splits the bank and decodes every clip. Clips are independent, so they're decoded in
/// parallel; the result is still in bank order.
pub fn decode_bank(bd: &[u8]) -> Vec<Vec<i16>> {
    formats::bd::split(bd)
        .into_par_iter()
        .map(spu_adpcm::decode_clip)
        .collect()
}

/// Decodes the bank and hands each clip to `sink`, in order, with its resolved rate.
pub fn convert_bank<F>(
    bd: &[u8],
    source: &RateSource,
    default_rate: u32,
    mut sink: F,
) -> Anyhow<usize>
where
    F: FnMut(Clip<'_>) -> Anyhow<()>,
{
    let clips = decode_bank(bd);
    let of = clips.len();
    log::debug!("{of} clips in bank");

    let resolved = rates::resolve(of, source, default_rate);
    match resolved.fallback {
        Fallback::None => {}
        Fallback::Default(rate) => log::info!("using default sample rate: {rate}"),
        Fallback::PaddedFrom{given, last} => log::warn!(
            "too little sample rate data in the hd file ({given} entries for {of} clips, wrong hd \
             file?); repeating last entry: {last}"
        ),
    }

    for (index, (pcm, rate)) in clips.iter().zip(resolved.rates).enumerate() {
        log::debug!("clip {index}: {} samples at {rate}Hz", pcm.len());
        sink(Clip{index, of, pcm, rate})?;
    }

    Ok(of)
}

/// `<dir>/<stem>.hd` beside the bank, if it exists.
pub fn sibling_hd(bd_path: &Path) -> Option<PathBuf> {
    let hd_path = bd_path.with_extension("hd");
    (hd_path.as_path() != bd_path && hd_path.is_file()).then_some(hd_path)
}

/// Sample rates from a header file. Problems with the header aren't fatal; they're reported
/// and an empty list comes back.
pub fn read_hd(hd_path: &Path) -> Vec<u16> {
    log::info!("reading hd file: {hd_path}...");
    let hd = match std::fs::read(hd_path) {
        Ok(hd) => hd,
        Err(e) => {
            log::warn!("hd file {hd_path} can't be read: {e}");
            return Vec::new();
        }
    };

    match formats::hd::read_sample_rates(&hd) {
        Ok(Some(info)) => info.rates,
        Ok(None) => {
            log::warn!("could not find any sample rate info in hd file {hd_path}");
            Vec::new()
        }
        Err(e) => {
            log::warn!("hd file {hd_path}: {e}");
            Vec::new()
        }
    }
}

pub fn rate_source(config: &Config) -> RateSource {
    if let Some(rate) = config.rate {return RateSource::Override(rate)}

    let hd_path = config.hd_path.clone()
        .or_else(|| {
            let found = sibling_hd(&config.bd_path)?;
            log::info!("found hd file: {found}");
            Some(found)
        });

    match hd_path {
        Some(hd_path) => RateSource::Header(read_hd(&hd_path)),
        None => RateSource::None,
    }
}

/// `<dir>/<stem>` beside the bank, or `<dir>/<stem>.out` when the bank has no extension and
/// the plain name would be the bank itself.
pub fn default_out_dir(bd_path: &Path) -> Anyhow<PathBuf> {
    let stem = bd_path.file_stem()
        .with_context(|| format!("{bd_path} has no file name"))?;
    let dir = bd_path.parent().unwrap_or(Path::new(""));
    let out_dir = dir.join(stem);
    if out_dir.file_name() != bd_path.file_name() {return Ok(out_dir)}
    Ok(dir.join(format!("{stem}.out")))
}

pub fn write_clip(out_dir: &Path, clip: Clip<'_>) -> Anyhow<()> {
    let path = out_dir.join(clip.file_name());
    let file = std::fs::File::create(&path)
        .with_context(|| format!("can't create {path}"))?;
    formats::wav::write_wav(std::io::BufWriter::new(file), clip.pcm, clip.rate)
        .with_context(|| format!("can't write {path}"))?
        .flush()
        .with_context(|| format!("can't write {path}"))?;
    Ok(())
}

/// Converts one bank on disk. An unreadable bank or an unwritable output is an error;
/// trouble with the header only costs the per-clip rates.
pub fn run(config: &Config) -> Anyhow<Summary> {
    let bd_path = &config.bd_path;
    log::info!("reading bd file: {bd_path}...");
    let bd = std::fs::read(bd_path)
        .with_context(|| format!("input file {bd_path} can't be read"))?;

    let source = rate_source(config);

    let out_dir = match &config.out_dir {
        Some(out_dir) => out_dir.clone(),
        None => default_out_dir(bd_path)?,
    };
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("can't create output directory {out_dir}"))?;

    let clips = convert_bank(&bd, &source, config.default_rate, |clip| write_clip(&out_dir, clip))?;
    Ok(Summary{clips, out_dir})
}
