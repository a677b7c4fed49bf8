use tracker_client::ExportFile;
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

/// Отдаёт файл браузеру через временный object URL и невидимую ссылку.
pub(crate) fn save_file(file: &ExportFile) -> Result<(), String> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| "document is not available".to_string())?;

    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(file.bytes.as_slice()));
    let options = BlobPropertyBag::new();
    options.set_type(&file.content_type);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
        .map_err(|_| "failed to create file".to_string())?;
    let url = Url::create_object_url_with_blob(&blob)
        .map_err(|_| "failed to create download link".to_string())?;

    let anchor = document
        .create_element("a")
        .map_err(|_| "failed to create download link".to_string())?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|_| "failed to create download link".to_string())?;
    anchor.set_href(&url);
    anchor.set_download(&file.file_name);
    anchor.click();

    Url::revoke_object_url(&url).map_err(|_| "failed to release download link".to_string())
}
