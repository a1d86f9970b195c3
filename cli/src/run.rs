use std::fs;
use std::path::Path;

use tracing::info;
use yaif_compiler::yaif_schema::SchemaModel;
use yaif_compiler::{compile_schema, generate, GenerateOptions, Target, YaifError};

pub fn check_extension(path: &Path) -> Result<(), YaifError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaif") => Ok(()),
        _ => Err(YaifError::InvalidInput(format!("{} is not a .yaif file", path.display()))),
    }
}

/// Read a `.yaif` schema file. Any other extension is rejected before reading.
pub fn read_schema(path: &Path) -> Result<String, YaifError> {
    check_extension(path)?;
    Ok(fs::read_to_string(path)?)
}

/// Read, compile and emit one schema file.
pub fn compile_file(path: &Path, target: Target, options: &GenerateOptions) -> Result<String, YaifError> {
    let text  = read_schema(path)?;
    let model = compile_schema(&text)?;
    generate(&model, target, options)
}

/// Write generated code to `output`, or print it when no path is given.
pub fn write_output(output: Option<&Path>, code: &str) -> Result<(), YaifError> {
    match output {
        Some(path) => {
            fs::write(path, code)?;
            info!(path = %path.display(), bytes = code.len(), "wrote generated code");
        }
        None => println!("{}", code),
    }
    Ok(())
}

/// One-line description of a valid model.
pub fn summary(model: &SchemaModel) -> String {
    format!(
        "{}: {} interface(s), {} enum(s), {} config key(s)",
        model.config.title(),
        model.interfaces.len(),
        model.enums.len(),
        model.config.explicit.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_rejects_other_extensions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("schema.txt");
        fs::write(&path, "[interface A]\nx: int\n").unwrap();
        assert!(matches!(read_schema(&path), Err(YaifError::InvalidInput(_))));
    }

    #[test]
    fn test_compile_file_to_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("app.yaif");
        let output = dir.path().join("app.ts");
        fs::write(&input, "[interface User]\nname: string\n").unwrap();

        let code = compile_file(&input, Target::TypeScript, &GenerateOptions::default()).unwrap();
        write_output(Some(&output), &code).unwrap();
        let written = fs::read_to_string(&output).unwrap();
        assert!(written.contains("export interface User {\n  name: string;\n}"));
    }

    #[test]
    fn test_compile_file_surfaces_diagnostics() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("bad.yaif");
        fs::write(&input, "[interface User]\nfriend: Nobody\n").unwrap();

        match compile_file(&input, Target::Python, &GenerateOptions::default()) {
            Err(YaifError::Diagnostics(diagnostics)) => assert_eq!(diagnostics.len(), 1),
            other => panic!("expected diagnostics, got {:?}", other),
        }
    }

    #[test]
    fn test_summary() {
        let model = compile_schema("[config]\ntitle: Shop\n[enum Size]\ns, m\n[interface Item]\nsize: Size\n").unwrap();
        assert_eq!(summary(&model), "Shop: 1 interface(s), 1 enum(s), 1 config key(s)");
    }
}
