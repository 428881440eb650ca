//! Raw bindings to the extension APIs the background worker uses.

use js_sys::{Function, Promise};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    // windows

    #[wasm_bindgen(catch, js_namespace = ["chrome", "windows"], js_name = get)]
    pub fn windows_get(window_id: f64, query: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "windows"], js_name = getAll)]
    pub fn windows_get_all(query: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "windows"], js_name = getLastFocused)]
    pub fn windows_get_last_focused(query: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "windows"], js_name = create)]
    pub fn windows_create(options: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "windows"], js_name = update)]
    pub fn windows_update(window_id: f64, update: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "windows"], js_name = remove)]
    pub fn windows_remove(window_id: f64) -> Result<Promise, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "windows", "onCreated"], js_name = addListener)]
    pub fn windows_on_created(cb: &Closure<dyn FnMut(JsValue)>);

    #[wasm_bindgen(js_namespace = ["chrome", "windows", "onRemoved"], js_name = addListener)]
    pub fn windows_on_removed(cb: &Closure<dyn FnMut(f64)>);

    #[wasm_bindgen(js_namespace = ["chrome", "windows", "onFocusChanged"], js_name = addListener)]
    pub fn windows_on_focus_changed(cb: &Closure<dyn FnMut(f64)>);

    #[wasm_bindgen(js_namespace = ["chrome", "windows", "onBoundsChanged"], js_name = addListener)]
    pub fn windows_on_bounds_changed(cb: &Closure<dyn FnMut(JsValue)>);

    // tabs

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = get)]
    pub fn tabs_get(tab_id: f64) -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = query)]
    pub fn tabs_query(query: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = create)]
    pub fn tabs_create(options: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = update)]
    pub fn tabs_update(tab_id: f64, update: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = remove)]
    pub fn tabs_remove(tab_id: f64) -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = move)]
    pub fn tabs_move(tab_id: f64, properties: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "tabs", "onCreated"], js_name = addListener)]
    pub fn tabs_on_created(cb: &Closure<dyn FnMut(JsValue)>);

    #[wasm_bindgen(js_namespace = ["chrome", "tabs", "onRemoved"], js_name = addListener)]
    pub fn tabs_on_removed(cb: &Closure<dyn FnMut(f64, JsValue)>);

    #[wasm_bindgen(js_namespace = ["chrome", "tabs", "onMoved"], js_name = addListener)]
    pub fn tabs_on_moved(cb: &Closure<dyn FnMut(f64, JsValue)>);

    #[wasm_bindgen(js_namespace = ["chrome", "tabs", "onUpdated"], js_name = addListener)]
    pub fn tabs_on_updated(cb: &Closure<dyn FnMut(f64, JsValue, JsValue)>);

    // displays and history

    #[wasm_bindgen(catch, js_namespace = ["chrome", "system", "display"], js_name = getInfo)]
    pub fn display_get_info() -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "history"], js_name = deleteUrl)]
    pub fn history_delete_url(details: &JsValue) -> Result<Promise, JsValue>;

    // storage

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = get)]
    pub fn storage_local_get(key: &str) -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = set)]
    pub fn storage_local_set(items: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = remove)]
    pub fn storage_local_remove(key: &str) -> Result<Promise, JsValue>;

    // runtime

    #[wasm_bindgen(js_namespace = ["chrome", "runtime"], js_name = getURL)]
    pub fn runtime_get_url(path: &str) -> String;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "runtime"], js_name = sendMessage)]
    pub fn runtime_send_message(message: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onMessage"], js_name = addListener)]
    pub fn runtime_on_message(cb: &Closure<dyn FnMut(JsValue, JsValue, Function) -> bool>);

    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onStartup"], js_name = addListener)]
    pub fn runtime_on_startup(cb: &Closure<dyn FnMut()>);

    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onInstalled"], js_name = addListener)]
    pub fn runtime_on_installed(cb: &Closure<dyn FnMut(JsValue)>);

    // commands and context menu

    #[wasm_bindgen(js_namespace = ["chrome", "commands", "onCommand"], js_name = addListener)]
    pub fn commands_on_command(cb: &Closure<dyn FnMut(String)>);

    #[wasm_bindgen(js_namespace = ["chrome", "contextMenus"], js_name = create)]
    pub fn context_menus_create(properties: &JsValue);

    #[wasm_bindgen(js_namespace = ["chrome", "contextMenus", "onClicked"], js_name = addListener)]
    pub fn context_menus_on_clicked(cb: &Closure<dyn FnMut(JsValue, JsValue)>);
}
