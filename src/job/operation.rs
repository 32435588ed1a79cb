//! Operation catalogue: endpoint, header value and result shape per operation.

use super::result::ResultShape;
use crate::{Error, ErrorContext};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    CreatePdf,
    CombinePdf,
    ExportPdf,
    ExportPdfFormData,
    ImportPdfFormData,
    PdfToImages,
    HtmlToPdf,
    Ocr,
    CompressPdf,
    LinearizePdf,
    ProtectPdf,
    InsertPages,
    ReplacePages,
    ReorderPages,
    RotatePages,
    DeletePages,
    RemoveProtection,
    SplitPdf,
    DocumentMerge,
    ExtractPdf,
    PdfProperties,
    AutotagPdf,
    ElectronicSeal,
    PdfWatermark,
    AccessibilityChecker,
}

struct OperationInfo {
    kind: OperationKind,
    name: &'static str,
    code: &'static str,
    header_info: &'static str,
    endpoint: &'static str,
    shape: ResultShape,
}

const fn op(
    kind: OperationKind,
    name: &'static str,
    code: &'static str,
    header_info: &'static str,
    endpoint: &'static str,
    shape: ResultShape,
) -> OperationInfo {
    OperationInfo {
        kind,
        name,
        code,
        header_info,
        endpoint,
        shape,
    }
}

use OperationKind as K;
use ResultShape as S;

// RotatePages reports "Reorder Pages Operation" on the wire; the service keys on that value.
#[rustfmt::skip]
static OPERATIONS: &[OperationInfo] = &[
    op(K::CreatePdf,            "create-pdf",            "CREATE_PDF",
       "Create PDF Operation",            "createpdf",            S::SingleAsset),
    op(K::CombinePdf,           "combine-pdf",           "COMBINE_PDF",
       "Combine Files Operation",         "combinepdf",           S::SingleAsset),
    op(K::ExportPdf,            "export-pdf",            "EXPORT_PDF",
       "Export PDF Operation",            "exportpdf",            S::SingleAsset),
    op(K::ExportPdfFormData,    "export-pdf-form-data",  "EXPORT_PDF_FORM_DATA",
       "Export PDF Form Data Operation",  "getformdata",          S::SingleAsset),
    op(K::ImportPdfFormData,    "import-pdf-form-data",  "IMPORT_PDF_FORM_DATA",
       "Import PDF Form Data Operation",  "setformdata",          S::SingleAsset),
    op(K::PdfToImages,          "pdf-to-images",         "PDF_TO_IMAGES",
       "Export PDF to Images Operation",  "pdftoimages",          S::Images),
    op(K::HtmlToPdf,            "html-to-pdf",           "HTML_TO_PDF",
       "HTML to PDF Operation",           "htmltopdf",            S::SingleAsset),
    op(K::Ocr,                  "ocr",                   "OCR",
       "OCR Operation",                   "ocr",                  S::SingleAsset),
    op(K::CompressPdf,          "compress-pdf",          "COMPRESS_PDF",
       "Compress PDF Operation",          "compresspdf",          S::SingleAsset),
    op(K::LinearizePdf,         "linearize-pdf",         "LINEARIZE_PDF",
       "Linearize PDF Operation",         "linearizepdf",         S::SingleAsset),
    op(K::ProtectPdf,           "protect-pdf",           "PROTECT_PDF",
       "Protect PDF Operation",           "protectpdf",           S::SingleAsset),
    op(K::InsertPages,          "insert-pages",          "INSERT_PAGES",
       "Insert Pages Operation",          "combinepdf",           S::SingleAsset),
    op(K::ReplacePages,         "replace-pages",         "REPLACE_PAGES",
       "Replace Pages Operation",         "combinepdf",           S::SingleAsset),
    op(K::ReorderPages,         "reorder-pages",         "REORDER_PAGES",
       "Reorder Pages Operation",         "combinepdf",           S::SingleAsset),
    op(K::RotatePages,          "rotate-pages",          "ROTATE_PAGES",
       "Reorder Pages Operation",         "pagemanipulation",     S::SingleAsset),
    op(K::DeletePages,          "delete-pages",          "DELETE_PAGES",
       "Delete Pages Operation",          "pagemanipulation",     S::SingleAsset),
    op(K::RemoveProtection,     "remove-protection",     "REMOVE_PROTECTION",
       "Remove Protection Operation",     "removeprotection",     S::SingleAsset),
    op(K::SplitPdf,             "split-pdf",             "SPLIT_PDF",
       "Split PDF Operation",             "splitpdf",             S::Split),
    op(K::DocumentMerge,        "document-merge",        "MERGE_DOCUMENT",
       "Document Merge Operation",        "documentgeneration",   S::SingleAsset),
    op(K::ExtractPdf,           "extract-pdf",           "EXTRACT_PDF",
       "Extract PDF Operation",           "extractpdf",           S::Extract),
    op(K::PdfProperties,        "pdf-properties",        "PDF_PROPERTIES",
       "PDF Properties Operation",        "pdfproperties",        S::Properties),
    op(K::AutotagPdf,           "autotag-pdf",           "AUTOTAG_PDF",
       "PDF Autotag Operation",           "autotag",              S::Autotag),
    op(K::ElectronicSeal,       "electronic-seal",       "ESEAL_PDF",
       "Electronic Seal Operation",       "electronicseal",       S::SingleAsset),
    op(K::PdfWatermark,         "pdf-watermark",         "PDF_WATERMARK",
       "Watermark PDF Operation",         "addwatermark",         S::SingleAsset),
    op(K::AccessibilityChecker, "accessibility-checker", "PDF_ACCESSIBILITY_CHECKER",
       "Accessibility Checker Operation", "accessibilitychecker", S::AccessibilityChecker),
];

impl OperationKind {
    fn info(&self) -> &'static OperationInfo {
        // Rows are in declaration order.
        &OPERATIONS[*self as usize]
    }

    pub fn all() -> impl Iterator<Item = OperationKind> {
        OPERATIONS.iter().map(|info| info.kind)
    }

    /// Kebab-case name used on the command line.
    pub fn name(&self) -> &'static str {
        self.info().name
    }

    /// Upper-case operation code, used in log fields.
    pub fn code(&self) -> &'static str {
        self.info().code
    }

    /// Value sent in the `x-dcsdk-ops-info` header.
    pub fn header_info(&self) -> &'static str {
        self.info().header_info
    }

    /// Path segment under `/operation/`.
    pub fn endpoint(&self) -> &'static str {
        self.info().endpoint
    }

    pub fn result_shape(&self) -> ResultShape {
        self.info().shape
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OperationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        OPERATIONS
            .iter()
            .find(|info| info.name == wanted)
            .map(|info| info.kind)
            .ok_or_else(|| {
                Error::client_with_context(
                    format!("unknown operation '{}'", s),
                    ErrorContext::new().with_field_path("operation"),
                )
            })
    }
}
