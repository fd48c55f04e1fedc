//! File type detection by extension.

/// Extensions of bundle-like directories that are referenced as a single,
/// opaque file.
pub const FOLDER_TYPE_EXTENSIONS: &[&str] = &[
    "bundle",
    "docc",
    "framework",
    "rcproject",
    "scnassets",
    "xcassets",
    "xcdatamodel",
    "xcframework",
    "xcmappingmodel",
    "xcstickers",
];

/// Interface Builder extensions a `.strings` file can be attached to, in
/// lookup order.
pub const IB_EXTENSIONS: &[&str] = &["storyboard", "xib", "intentdefinition"];

/// File type of a Bazel `BUILD` file.
pub const BAZEL_BUILD_FILE_TYPE: &str = "text.script.python";

/// File type of a CocoaPods `Podfile`.
pub const RUBY_FILE_TYPE: &str = "text.script.ruby";

/// The extension of a file name, if any.
///
/// A leading dot does not start an extension (`.gitignore` has none).
pub fn extension(name: &str) -> Option<&str> {
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&name[idx + 1..]),
    }
}

/// The file name without its extension.
pub fn stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

/// Check if an extension denotes an opaque folder.
pub fn is_folder_type_extension(ext: Option<&str>) -> bool {
    ext.is_some_and(|ext| FOLDER_TYPE_EXTENSIONS.contains(&ext))
}

/// The last-known file type for an extension.
pub fn file_type_for_extension(ext: &str) -> Option<&'static str> {
    let file_type = match ext {
        "a" => "archive.ar",
        "app" => "wrapper.application",
        "appex" => "wrapper.app-extension",
        "bazel" | "bzl" => BAZEL_BUILD_FILE_TYPE,
        "bundle" => "wrapper.plug-in",
        "c" => "sourcecode.c.c",
        "cc" | "cpp" | "cxx" => "sourcecode.cpp.cpp",
        "dylib" => "compiled.mach-o.dylib",
        "docc" => "folder.documentationcatalog",
        "entitlements" => "text.plist.entitlements",
        "framework" => "wrapper.framework",
        "gif" => "image.gif",
        "h" => "sourcecode.c.h",
        "hh" | "hpp" | "hxx" => "sourcecode.cpp.h",
        "html" => "text.html",
        "intentdefinition" => "file.intentdefinition",
        "jpeg" | "jpg" => "image.jpeg",
        "js" => "sourcecode.javascript",
        "json" => "text.json",
        "m" => "sourcecode.c.objc",
        "md" => "net.daringfireball.markdown",
        "metal" => "sourcecode.metal",
        "mlmodel" => "file.mlmodel",
        "mm" => "sourcecode.cpp.objcpp",
        "modulemap" => "sourcecode.module-map",
        "pdf" => "image.pdf",
        "plist" => "text.plist.xml",
        "png" => "image.png",
        "py" => "text.script.python",
        "rb" => RUBY_FILE_TYPE,
        "rcproject" => "file.rcproject",
        "s" => "sourcecode.asm",
        "scnassets" => "wrapper.scnassets",
        "sh" => "text.script.sh",
        "storyboard" => "file.storyboard",
        "strings" => "text.plist.strings",
        "stringsdict" => "text.plist.stringsdict",
        "swift" => "sourcecode.swift",
        "ttf" => "file",
        "txt" => "text",
        "xcassets" => "folder.assetcatalog",
        "xcconfig" => "text.xcconfig",
        "xcdatamodel" => "wrapper.xcdatamodel",
        "xcdatamodeld" => "wrapper.xcdatamodeld",
        "xcframework" => "wrapper.xcframework",
        "xcmappingmodel" => "wrapper.xcmappingmodel",
        "xcstickers" => "folder.stickers",
        "xcstrings" => "text.json.xcstrings",
        "xctest" => "wrapper.cfbundle",
        "xib" => "file.xib",
        "xml" => "text.xml",
        "yaml" | "yml" => "text.yaml",
        _ => return None,
    };
    Some(file_type)
}

/// File type forced by the file's name, regardless of its extension.
pub fn explicit_file_type(name: &str) -> Option<&'static str> {
    match name {
        "BUILD" => Some(BAZEL_BUILD_FILE_TYPE),
        "Podfile" => Some(RUBY_FILE_TYPE),
        _ => None,
    }
}

/// The last-known file type for a file element.
///
/// `BUILD` and `Podfile` are typed by name. Unknown extensions fall back to
/// `folder` for opaque directories and `file` otherwise.
pub fn last_known_file_type(name: &str, is_folder: bool) -> &'static str {
    if let Some(file_type) = explicit_file_type(name) {
        return file_type;
    }

    match extension(name).and_then(file_type_for_extension) {
        Some(file_type) => file_type,
        None if is_folder => "folder",
        None => "file",
    }
}

/// Priority of a localized file's extension when forming variant groups.
///
/// Higher sorts first.
pub fn localized_extension_priority(ext: Option<&str>) -> u8 {
    match ext {
        Some("intentdefinition") => 4,
        Some("storyboard") => 3,
        Some("xib") => 2,
        Some("strings") => 1,
        _ => 0,
    }
}
