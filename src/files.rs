//! Classification of workspace files by name.

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

const CODE_EXTENSIONS: &[&str] = &[
  "py", "js", "ts", "html", "css", "json", "xml", "yaml", "yml", "md", "txt", "sh", "bash", "c",
  "cpp", "h", "hpp", "java", "rs", "go", "php", "rb", "sql", "cellml", "sedml", "omex", "csv",
  "r", "matlab", "m", "gitignore", "gitmodules", "gitattributes", "editorconfig", "eslintrc",
  "prettierrc", "env", "dockerfile", "makefile", "cmake", "gradle", "maven", "ini", "conf",
  "config", "toml", "lock",
];

/// Text files conventionally named without an extension.
const CODE_FILENAMES: &[&str] = &[
  "Makefile",
  "Dockerfile",
  "Gemfile",
  "Rakefile",
  "Procfile",
  "Vagrantfile",
  "LICENSE",
  "README",
];

const BINARY_EXTENSIONS: &[&str] = &[
  "pdf", "png", "jpg", "jpeg", "gif", "bmp", "webp", "svg", "zip", "tar", "gz", "rar", "7z",
  "exe", "dll", "so", "dylib", "mp3", "mp4", "avi", "mov", "wav", "doc", "docx", "xls", "xlsx",
  "ppt", "pptx", "ai",
];

/// Lowercased extension, or `""` if there is none.
///
/// A dotfile such as `.gitignore` reports the name after the dot.
pub fn file_extension(filename: &str) -> String {
  if let Some(rest) = filename.strip_prefix('.') {
    if !rest.contains('.') {
      return rest.to_lowercase();
    }
  }

  match filename.rfind('.') {
    Some(i) if i > 0 && i < filename.len() - 1 => filename[i + 1..].to_lowercase(),
    _ => String::new(),
  }
}

fn has_extension(filename: &str, extensions: &[&str]) -> bool {
  extensions.contains(&file_extension(filename).as_str())
}

/// Raster images; SVG is reported separately.
pub fn is_image_file(filename: &str) -> bool {
  has_extension(filename, IMAGE_EXTENSIONS)
}

pub fn is_svg_file(filename: &str) -> bool {
  file_extension(filename) == "svg"
}

pub fn is_pdf_file(filename: &str) -> bool {
  file_extension(filename) == "pdf"
}

pub fn is_markdown_file(filename: &str) -> bool {
  has_extension(filename, &["md", "markdown"])
}

pub fn is_code_file(filename: &str) -> bool {
  has_extension(filename, CODE_EXTENSIONS) || CODE_FILENAMES.contains(&filename)
}

pub fn is_binary_file(filename: &str) -> bool {
  has_extension(filename, BINARY_EXTENSIONS)
}
