//! c2datem shell script generation.
//!
//! Builds the `datem.sh` script that runs c2datem once per cdump file,
//! particle size and vertical level, optionally concatenating every output
//! into one file tagged with the size and level it came from.

use crate::constants::{
    C2DATEM_TOOL, CDUMP_MARKER, DATEM_DEFINITION_FILE, DEFAULT_CONCAT_FILE, DEFAULT_MODEL_DIR,
    DEFAULT_MULTIPLIER, DEFAULT_SCRIPT_NAME, FALLBACK_PARTICLE_SIZE, HEIGHT_LEVEL, MODEL_MARKER,
};
use crate::error::{DatemError, Result};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// The cdump files to extract from, with their output base names
#[derive(Debug, Clone, PartialEq)]
pub struct CdumpFileSet {
    inputs: Vec<String>,
    outputs: Vec<String>,
    extra_info: Option<Vec<String>>,
}

impl CdumpFileSet {
    /// Output base names default to the input name with `cdump` replaced by `model`
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let inputs: Vec<String> = inputs
            .into_iter()
            .map(|s| s.into().trim().to_string())
            .collect();
        let outputs = inputs
            .iter()
            .map(|input| input.replace(CDUMP_MARKER, MODEL_MARKER))
            .collect();

        Self {
            inputs,
            outputs,
            extra_info: None,
        }
    }

    /// Use explicit output base names, one per input
    pub fn with_output_names(mut self, outputs: Vec<String>) -> Result<Self> {
        check_length("output names", self.inputs.len(), outputs.len())?;
        self.outputs = outputs;
        Ok(self)
    }

    /// Tokens appended to every concatenated line, one per input
    pub fn with_extra_info(mut self, extra_info: Vec<String>) -> Result<Self> {
        check_length("extra info", self.inputs.len(), extra_info.len())?;
        self.extra_info = Some(extra_info);
        Ok(self)
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn extra_info(&self) -> Option<&[String]> {
        self.extra_info.as_deref()
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

fn check_length(what: &str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(DatemError::LengthMismatch {
            what: what.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}

/// Settings for the generated script
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptOptions {
    /// Concentration multiplier (`-c`)
    pub multiplier: String,
    /// Directory holding the c2datem executable
    pub model_dir: String,
    /// Particle size indices (`-p`); non-integers fall back to 1
    pub particle_sizes: Vec<String>,
    /// Vertical level indices (`-z`); -1 selects by height
    pub levels: Vec<i32>,
    /// Append every output to `concat_file`
    pub concat: bool,
    pub concat_file: String,
    /// Where the script is written
    pub script_path: PathBuf,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            multiplier: DEFAULT_MULTIPLIER.to_string(),
            model_dir: DEFAULT_MODEL_DIR.to_string(),
            particle_sizes: vec!["1".to_string()],
            levels: vec![1],
            concat: true,
            concat_file: DEFAULT_CONCAT_FILE.to_string(),
            script_path: PathBuf::from(DEFAULT_SCRIPT_NAME),
        }
    }
}

/// Rendered script text and the c2datem output files it produces
#[derive(Debug, Clone, PartialEq)]
pub struct DatemScript {
    pub content: String,
    pub output_files: Vec<String>,
}

/// Parse a particle size index, falling back to 1 when it is not an integer
pub fn parse_particle_size(raw: &str) -> u64 {
    match raw.trim().parse::<i64>() {
        Ok(size) => size.unsigned_abs(),
        Err(_) => {
            warn!(
                "Particle size '{}' is not an integer, using {}",
                raw, FALLBACK_PARTICLE_SIZE
            );
            u64::from(FALLBACK_PARTICLE_SIZE)
        }
    }
}

/// Output file name for one base name, particle size and level
///
/// `<base>.p<size>.z<level>.txt`, or `<base>.p<size>zn1.txt` for level -1.
pub fn output_file_name(base: &str, size: u64, level: i32) -> String {
    let level_token = if level == HEIGHT_LEVEL {
        "zn1".to_string()
    } else {
        format!(".z{}", level)
    };
    format!("{}.p{}{}.txt", base, size, level_token)
}

/// Render the script without touching the filesystem
pub fn render_datem_script(files: &CdumpFileSet, options: &ScriptOptions) -> DatemScript {
    let sizes: Vec<u64> = options
        .particle_sizes
        .iter()
        .map(|raw| parse_particle_size(raw))
        .collect();

    let mut lines = vec![
        "#!/bin/sh".to_string(),
        format!("rm -f {}", options.concat_file),
        format!("MDL={}", options.model_dir),
        format!("mult={}", options.multiplier),
    ];
    let mut output_files = Vec::new();

    for &level in &options.levels {
        lines.push(format!("zl={}", level));

        for (index, (input, base)) in files.inputs.iter().zip(&files.outputs).enumerate() {
            for &size in &sizes {
                let outfile = output_file_name(base, size, level);

                lines.push(format!(
                    "$MDL/{} -n -h0 -i{} -m{} -o{} -c$mult -z$zl -p{}",
                    C2DATEM_TOOL, input, DATEM_DEFINITION_FILE, outfile, size
                ));

                if options.concat {
                    lines.push(match files.extra_info() {
                        Some(extra) => format!(
                            "sed 's/$/ {} {} {}/' {} >> {}",
                            extra[index], size, level, outfile, options.concat_file
                        ),
                        None => format!("cat {} >> {}", outfile, options.concat_file),
                    });
                }

                output_files.push(outfile);
            }
        }
    }

    lines.push(format!("if [ ! -s {} ]", options.concat_file));
    lines.push("then".to_string());
    lines.push(format!("rm -f {}", options.concat_file));
    lines.push("fi".to_string());

    let mut content = lines.join("\n");
    content.push('\n');

    DatemScript {
        content,
        output_files,
    }
}

/// Write the c2datem script to `options.script_path`
///
/// Returns the c2datem output file names in invocation order (level, then
/// file, then particle size). The script is not executed.
pub fn write_datem_script(files: &CdumpFileSet, options: &ScriptOptions) -> Result<Vec<String>> {
    let script = render_datem_script(files, options);
    fs::write(&options.script_path, &script.content)?;

    debug!(
        "Wrote {} with {} c2datem invocations",
        options.script_path.display(),
        script.output_files.len()
    );
    Ok(script.output_files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_output_names() {
        let files = CdumpFileSet::new(["cdump.ash1", " cdump.ash2 "]);
        assert_eq!(files.inputs(), &["cdump.ash1", "cdump.ash2"]);
        assert_eq!(files.outputs(), &["model.ash1", "model.ash2"]);
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_output_file_name_levels() {
        assert_eq!(output_file_name("model.ash", 2, 1), "model.ash.p2.z1.txt");
        assert_eq!(output_file_name("model.ash", 2, 0), "model.ash.p2.z0.txt");
        assert_eq!(output_file_name("model.ash", 2, -1), "model.ash.p2zn1.txt");
        assert_eq!(output_file_name("model.ash", 3, -2), "model.ash.p3.z-2.txt");
    }

    #[test]
    fn test_particle_size_fallback() {
        assert_eq!(parse_particle_size("4"), 4);
        assert_eq!(parse_particle_size("-3"), 3);
        assert_eq!(parse_particle_size("abc"), 1);
        assert_eq!(parse_particle_size("1.5"), 1);
    }

    #[test]
    fn test_invalid_particle_size_uses_one() {
        let files = CdumpFileSet::new(["cdump.run"]);
        let options = ScriptOptions {
            particle_sizes: vec!["abc".to_string()],
            ..ScriptOptions::default()
        };

        let script = render_datem_script(&files, &options);
        assert_eq!(script.output_files, vec!["model.run.p1.z1.txt"]);
        assert!(script.content.contains("-omodel.run.p1.z1.txt -c$mult -z$zl -p1\n"));
    }

    #[test]
    fn test_invocation_order_and_layout() {
        let files = CdumpFileSet::new(["cdumpA", "cdumpB"]);
        let options = ScriptOptions {
            multiplier: "1e15".to_string(),
            model_dir: "/opt/hysplit/exec".to_string(),
            particle_sizes: vec!["1".to_string(), "2".to_string()],
            levels: vec![1, -1],
            concat: false,
            ..ScriptOptions::default()
        };

        let script = render_datem_script(&files, &options);
        assert_eq!(
            script.output_files,
            vec![
                "modelA.p1.z1.txt",
                "modelA.p2.z1.txt",
                "modelB.p1.z1.txt",
                "modelB.p2.z1.txt",
                "modelA.p1zn1.txt",
                "modelA.p2zn1.txt",
                "modelB.p1zn1.txt",
                "modelB.p2zn1.txt",
            ]
        );

        let lines: Vec<&str> = script.content.lines().collect();
        assert_eq!(lines[0], "#!/bin/sh");
        assert_eq!(lines[1], "rm -f model.txt");
        assert_eq!(lines[2], "MDL=/opt/hysplit/exec");
        assert_eq!(lines[3], "mult=1e15");
        assert_eq!(lines[4], "zl=1");
        assert_eq!(
            lines[5],
            "$MDL/c2datem -n -h0 -icdumpA -mdatemfile.txt -omodelA.p1.z1.txt -c$mult -z$zl -p1"
        );
        assert_eq!(lines[9], "zl=-1");
        assert!(!script.content.contains("sed "));
        assert!(!script.content.contains("cat "));
    }

    #[test]
    fn test_full_script_text() {
        let files = CdumpFileSet::new(["cdump.a"]);
        let options = ScriptOptions {
            model_dir: "/hysplit".to_string(),
            ..ScriptOptions::default()
        };

        let script = render_datem_script(&files, &options);
        assert_eq!(
            script.content,
            "#!/bin/sh\n\
             rm -f model.txt\n\
             MDL=/hysplit\n\
             mult=1e20\n\
             zl=1\n\
             $MDL/c2datem -n -h0 -icdump.a -mdatemfile.txt -omodel.a.p1.z1.txt -c$mult -z$zl -p1\n\
             cat model.a.p1.z1.txt >> model.txt\n\
             if [ ! -s model.txt ]\n\
             then\n\
             rm -f model.txt\n\
             fi\n"
        );
    }

    #[test]
    fn test_concat_with_extra_info() {
        let files = CdumpFileSet::new(["cdump.a", "cdump.b"])
            .with_extra_info(vec!["STA".to_string(), "STB".to_string()])
            .unwrap();
        let options = ScriptOptions {
            particle_sizes: vec!["3".to_string()],
            levels: vec![2],
            concat_file: "all.txt".to_string(),
            ..ScriptOptions::default()
        };

        let script = render_datem_script(&files, &options);
        assert!(
            script
                .content
                .contains("sed 's/$/ STA 3 2/' model.a.p3.z2.txt >> all.txt\n")
        );
        assert!(
            script
                .content
                .contains("sed 's/$/ STB 3 2/' model.b.p3.z2.txt >> all.txt\n")
        );
        assert!(
            script
                .content
                .ends_with("if [ ! -s all.txt ]\nthen\nrm -f all.txt\nfi\n")
        );
    }

    #[test]
    fn test_concat_without_extra_info_uses_cat() {
        let files = CdumpFileSet::new(["cdump.a"]);
        let script = render_datem_script(&files, &ScriptOptions::default());
        assert!(
            script
                .content
                .contains("cat model.a.p1.z1.txt >> model.txt\n")
        );
    }

    #[test]
    fn test_length_mismatch() {
        let result = CdumpFileSet::new(["cdump.a", "cdump.b"]).with_output_names(vec!["x".into()]);
        match result {
            Err(DatemError::LengthMismatch {
                expected, found, ..
            }) => {
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("Expected LengthMismatch error, got {:?}", other),
        }

        assert!(
            CdumpFileSet::new(["cdump.a"])
                .with_extra_info(vec![])
                .is_err()
        );
    }

    #[test]
    fn test_write_script_file() {
        let temp_dir = TempDir::new().unwrap();
        let options = ScriptOptions {
            script_path: temp_dir.path().join("datem.sh"),
            ..ScriptOptions::default()
        };
        let files = CdumpFileSet::new(["cdump.x"])
            .with_output_names(vec!["out.x".to_string()])
            .unwrap();

        let outputs = write_datem_script(&files, &options).unwrap();
        assert_eq!(outputs, vec!["out.x.p1.z1.txt"]);

        let content = std::fs::read_to_string(&options.script_path).unwrap();
        assert!(content.starts_with("#!/bin/sh\n"));
        assert!(content.contains("-icdump.x "));
    }
}
