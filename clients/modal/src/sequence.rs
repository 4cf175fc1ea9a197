use std::{path::Path, str::FromStr};

use crate::{table, ModalError, Result};

/// Physical range `[min,max]` of a mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeRange {
    pub min: f64,
    pub max: f64,
}

impl FromStr for ModeRange {
    type Err = String;

    /// Parses a bracketed range, e.g. `[-5,5]`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let inner = s
            .find('[')
            .zip(s.rfind(']'))
            .filter(|(start, end)| start < end)
            .map(|(start, end)| &s[start + 1..end])
            .ok_or_else(|| format!("{s:?} is not a bracketed [min,max] range"))?;
        let Some((min, max)) = inner.split_once(',') else {
            return Err(format!("{s:?} is not a [min,max] range"));
        };
        let parse = |x: &str| {
            x.trim()
                .parse::<f64>()
                .ok()
                .filter(|x| x.is_finite())
                .ok_or_else(|| format!("{s:?} range bound {x:?} is not a number"))
        };
        Ok(Self {
            min: parse(min)?,
            max: parse(max)?,
        })
    }
}

/// Sequence of modal coefficients
///
/// Each row holds the coefficients of the modes as fractions of each mode maximum.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaybackSequence {
    headers: Vec<String>,
    ranges: Vec<ModeRange>,
    rows: Vec<Vec<f64>>,
}

impl PlaybackSequence {
    /// Creates a sequence from the modes physical ranges and the raw modes magnitudes
    ///
    /// Each magnitude is divided by the maximum of the mode range
    pub fn new(
        headers: Vec<String>,
        ranges: Vec<ModeRange>,
        magnitudes: Vec<Vec<f64>>,
    ) -> Result<Self> {
        Self::build(headers, ranges, magnitudes, "playback sequence", |i| i as u64)
    }
    fn build(
        headers: Vec<String>,
        ranges: Vec<ModeRange>,
        magnitudes: Vec<Vec<f64>>,
        origin: &str,
        line: impl Fn(usize) -> u64,
    ) -> Result<Self> {
        let parse_error = |line: u64, reason: String| ModalError::ConfigParse {
            origin: origin.to_string(),
            line,
            reason,
        };
        if ranges.is_empty() {
            return Err(parse_error(line(0), "no mode ranges".into()));
        }
        if let Some((i, range)) = ranges.iter().enumerate().find(|(_, r)| r.max == 0.) {
            return Err(parse_error(
                line(0),
                format!("mode #{} range [{},{}] has a zero maximum", i + 1, range.min, range.max),
            ));
        }
        let n_mode = ranges.len();
        let rows = magnitudes
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                if row.len() != n_mode {
                    Err(parse_error(
                        line(i + 1),
                        format!("found {} values, expected {n_mode}", row.len()),
                    ))
                } else {
                    Ok(row
                        .into_iter()
                        .zip(&ranges)
                        .map(|(value, range)| value / range.max)
                        .collect())
                }
            })
            .collect::<Result<Vec<Vec<f64>>>>()?;
        Ok(Self {
            headers,
            ranges,
            rows,
        })
    }
    /// Loads a sequence from a comma separated file
    ///
    /// The first line holds the headers, the second line the `"[min,max]"` range of each mode
    /// and the following lines the magnitudes of each mode
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        log::info!("loading playback sequence from {origin}");
        let mut reader = table::open(path)?;
        let records = table::records(&mut reader, &origin)?;
        let mut records = records.into_iter();
        let parse_error = |line: u64, reason: &str| ModalError::ConfigParse {
            origin: origin.clone(),
            line,
            reason: reason.to_string(),
        };
        let (_, headers) = records
            .next()
            .ok_or_else(|| parse_error(1, "missing headers"))?;
        let (range_line, range_record) = records
            .next()
            .ok_or_else(|| parse_error(2, "missing mode ranges"))?;
        let ranges = range_record
            .iter()
            .map(|field| {
                field
                    .parse::<ModeRange>()
                    .map_err(|reason| parse_error(range_line, &reason))
            })
            .collect::<Result<Vec<_>>>()?;
        let mut lines = vec![range_line];
        let mut magnitudes = vec![];
        for (line, record) in records {
            magnitudes.push(table::parse_record(&record, &origin, line)?);
            lines.push(line);
        }
        let this = Self::build(
            headers.iter().map(|h| h.to_string()).collect(),
            ranges,
            magnitudes,
            &origin,
            |i| lines[i],
        )?;
        log::debug!("playback sequence: {} steps x {} modes", this.len(), this.n_mode());
        Ok(this)
    }
    /// Returns the number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }
    /// Checks if the sequence has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
    /// Returns the number of modes
    pub fn n_mode(&self) -> usize {
        self.ranges.len()
    }
    /// Returns the column headers
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
    /// Returns the modes physical ranges
    pub fn ranges(&self) -> &[ModeRange] {
        &self.ranges
    }
    /// Returns the modal coefficients of the row `i`
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        self.rows.get(i).map(|row| row.as_slice())
    }
    /// Iterates over the rows
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.rows.iter().map(|row| row.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use std::{error::Error, fs};

    use super::*;

    #[test]
    fn ranges() {
        assert_eq!(
            "[-5,10]".parse::<ModeRange>(),
            Ok(ModeRange { min: -5., max: 10. })
        );
        assert_eq!(
            " [ -0.5 , 2.5 ] ".parse::<ModeRange>(),
            Ok(ModeRange { min: -0.5, max: 2.5 })
        );
        assert!("-5,10".parse::<ModeRange>().is_err());
        assert!("[-5]".parse::<ModeRange>().is_err());
        assert!("[a,1]".parse::<ModeRange>().is_err());
        assert!("]1,2[".parse::<ModeRange>().is_err());
    }

    #[test]
    fn percentages() -> std::result::Result<(), Box<dyn Error>> {
        let sequence = PlaybackSequence::new(
            vec!["Tilt Y".into(), "Tilt X".into()],
            vec![ModeRange { min: -2., max: 2. }, ModeRange { min: -4., max: 4. }],
            vec![vec![1., -4.], vec![0., 2.]],
        )?;
        assert_eq!(sequence.len(), 2);
        assert_eq!(sequence.n_mode(), 2);
        assert_eq!(sequence.row(0), Some([0.5, -1.].as_slice()));
        assert_eq!(sequence.row(1), Some([0., 0.5].as_slice()));
        assert_eq!(sequence.row(2), None);
        Ok(())
    }

    #[test]
    fn zero_max() {
        assert!(matches!(
            PlaybackSequence::new(vec![], vec![ModeRange { min: -1., max: 0. }], vec![]),
            Err(ModalError::ConfigParse { .. })
        ));
    }

    #[test]
    fn from_path() -> std::result::Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("ZernikeMags.csv");
        fs::write(
            &path,
            "Tilt Y,Tilt X,Power\n\"[-5,5]\",\"[-10,10]\",\"[-2,2]\"\n5,0,1\n-2.5,10,-2\n",
        )?;
        let sequence = PlaybackSequence::from_path(&path)?;
        assert_eq!(sequence.headers(), ["Tilt Y", "Tilt X", "Power"]);
        assert_eq!(sequence.ranges()[1], ModeRange { min: -10., max: 10. });
        let rows: Vec<_> = sequence.rows().collect();
        assert_eq!(rows, [[1., 0., 0.5], [-0.5, 1., -1.]]);
        Ok(())
    }

    #[test]
    fn malformed_rows() -> std::result::Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("short.csv");
        fs::write(&path, "A,B\n\"[-1,1]\",\"[-1,1]\"\n1,1\n0.5\n")?;
        let err = PlaybackSequence::from_path(&path).unwrap_err();
        assert!(matches!(err, ModalError::ConfigParse { line: 4, .. }), "{err:?}");

        let path = dir.path().join("nan.csv");
        fs::write(&path, "A\n\"[-1,1]\"\nx\n")?;
        let err = PlaybackSequence::from_path(&path).unwrap_err();
        assert!(matches!(err, ModalError::ConfigParse { line: 3, .. }), "{err:?}");

        let path = dir.path().join("headers.csv");
        fs::write(&path, "A,B\n")?;
        let err = PlaybackSequence::from_path(&path).unwrap_err();
        assert!(matches!(err, ModalError::ConfigParse { .. }), "{err:?}");

        let err = PlaybackSequence::from_path(dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, ModalError::ConfigNotFound(_)), "{err:?}");
        Ok(())
    }
}
