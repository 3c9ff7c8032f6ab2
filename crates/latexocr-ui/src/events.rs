use latexocr_types::{CapturedImage, SettingsForm, UiUpdate};
use slint::{ComponentHandle, Image, Rgba8Pixel, SharedPixelBuffer};

use crate::SettingsDialog;
use crate::state::UiShell;

/// Apply one controller update. Returns false once the UI should close.
pub(crate) fn apply_update(shell: &mut UiShell, update: UiUpdate) -> bool {
    match update {
        UiUpdate::Status(text) => {
            tracing::debug!("[UI] Status: {}", text);
            shell.main.set_status(text.into());
        }
        UiUpdate::Busy(busy) => shell.main.set_busy(busy),
        UiUpdate::LatexText(text) => shell.main.set_latex_text(text.into()),
        UiUpdate::CapturedImage(image) => match to_pixel_buffer(&image) {
            Some(buffer) => {
                shell.main.set_captured_image(Image::from_rgba8(buffer));
                shell.main.set_has_image(true);
            }
            None => tracing::warn!("[UI] Dropping malformed image {:?}", image),
        },
        UiUpdate::PreviewNote(note) => shell.main.set_preview_note(note.into()),
        UiUpdate::ShowError { title, message } => {
            shell.error.set_heading(title.into());
            shell.error.set_message(message.into());
            if let Err(e) = shell.error.show() {
                tracing::error!("[UI] Failed to show error dialog: {}", e);
            }
        }
        UiUpdate::ShowSettings(form) => {
            write_form(&shell.settings, &form);
            if let Err(e) = shell.settings.show() {
                tracing::error!("[UI] Failed to show settings: {}", e);
            }
        }
        UiUpdate::HotkeyLabel(label) => shell.main.set_hotkey_label(label.into()),
        UiUpdate::Close => {
            let _ = shell.settings.hide();
            let _ = shell.error.hide();
            let _ = shell.overlay.hide();
            let _ = shell.main.hide();
            return false;
        }
    }
    true
}

pub(crate) fn write_form(dialog: &SettingsDialog, form: &SettingsForm) {
    dialog.set_api_base_url(form.api_base_url.as_str().into());
    dialog.set_api_key(form.api_key.as_str().into());
    dialog.set_api_model(form.api_model.as_str().into());
    dialog.set_api_format(form.api_format.as_str().into());
    dialog.set_copy_format(form.copy_format.as_str().into());
    dialog.set_hotkey(form.hotkey.as_str().into());
}

pub(crate) fn read_form(dialog: &SettingsDialog) -> SettingsForm {
    SettingsForm {
        api_base_url: dialog.get_api_base_url().to_string(),
        api_key: dialog.get_api_key().to_string(),
        api_model: dialog.get_api_model().to_string(),
        api_format: dialog.get_api_format().to_string(),
        copy_format: dialog.get_copy_format().to_string(),
        hotkey: dialog.get_hotkey().to_string(),
    }
}

fn to_pixel_buffer(image: &CapturedImage) -> Option<SharedPixelBuffer<Rgba8Pixel>> {
    let expected = image.width as usize * image.height as usize * 4;
    if image.is_empty() || image.rgba.len() != expected {
        return None;
    }
    Some(SharedPixelBuffer::<Rgba8Pixel>::clone_from_slice(
        &image.rgba,
        image.width,
        image.height,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_buffer_checks_size() {
        let good = CapturedImage {
            width: 2,
            height: 1,
            rgba: vec![1, 2, 3, 4, 5, 6, 7, 8],
        };
        let buffer = to_pixel_buffer(&good).unwrap();
        assert_eq!((buffer.width(), buffer.height()), (2, 1));

        let short = CapturedImage {
            width: 2,
            height: 2,
            rgba: vec![0; 8],
        };
        assert!(to_pixel_buffer(&short).is_none());
    }
}
