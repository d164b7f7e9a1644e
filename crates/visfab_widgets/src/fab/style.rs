//! Shadow root stylesheet

use crate::config::FabFeatures;

const WRAPPER_RULE: &str = ".vis-fab-wrapper{width:var(--width, 50px);height:var(--height, 50px);\
position:relative;border-radius:var(--border-radius, 100%);display:flex;justify-content:center;\
align-items:center;";
const WRAPPER_MARGINS: &str = "margin-bottom:var(--marginbottom, 16px);margin-right:var(--marginright, 16px);";
const WRAPPER_MARGIN_FIXED: &str = "margin:16px;";
const WRAPPER_ANCHOR: &str = "position:fixed;bottom:var(--positiony);right:var(--positionx);z-index:999}";

const BUTTON_RULES: &str = ".vis-fab-wrapper .vis-fab{background:var(--background, #4285f4);\
width:var(--width, 50px);height:var(--height, 50px);position:relative;z-index:3;\
border-radius:var(--borderradius, 100%);box-shadow:0 2px 4px rgba(0, 0, 0, 0.4);display:flex;\
justify-content:center;align-items:center;animation:vis-fab-animation-reverse 0.4s ease-out forwards}\
.vis-fab-wrapper .vis-fab::before,.vis-fab-wrapper .vis-fab::after{content:\"\";display:block;\
position:absolute;border-radius:4px;background:var(--fabcolor, #FFFFFF)}\
.vis-fab-wrapper .vis-fab::before{width:4px;height:18px}\
.vis-fab-wrapper .vis-fab::after{width:18px;height:4px}";

const CONTEXT_RULES: &str = ".vis-fab-wrapper .vis-fab-context{width:var(--contextw, auto);\
min-width:60px;height:var(--contexth, auto);\
border-radius:var(--ctxradius, 0) var(--ctxradius, 0) 0 var(--ctxradius, 0);position:absolute;\
background:var(--contextbg, #FFFFFF);z-index:2;padding:0.5rem 0.5rem;\
box-shadow:0 2px 4px rgba(0, 0, 0, 0.4);opacity:0;right:0;bottom:0;display:flex;\
flex-direction:column;justify-content:space-around;align-items:center;visibility:hidden;\
transition:opacity 0.2s ease-in, bottom 0.2s ease-in, width 0.1s ease-in, visibility 0.2s linear}";

const CONTEXT_RULES_FIXED: &str = ".vis-fab-wrapper .vis-fab-context{width:32px;height:150px;\
border-radius:64px;position:absolute;background:#fff;z-index:2;padding:0.5rem 0.5rem;\
box-shadow:0 2px 4px rgba(0, 0, 0, 0.4);opacity:0;top:-110px;display:flex;flex-direction:column;\
justify-content:space-around;align-items:center;\
transition:opacity 0.2s ease-in, top 0.2s ease-in, width 0.1s ease-in}";

const TOGGLE_RULES: &str = ".vis-fab-wrapper input{height:100%;width:100%;\
border-radius:var(--borderradius);cursor:pointer;position:absolute;z-index:5;opacity:0}\
.vis-fab-wrapper input:checked~.vis-fab{animation:vis-fab-animation 0.4s ease-out forwards}";

const CONTEXT_OPEN_RULE: &str = ".vis-fab-wrapper input:checked~.vis-fab-context{\
animation:vis-fac-animation 0.4s ease-out forwards 0.1s;height:var(--contexth, auto);opacity:1;\
bottom:110%;visibility:visible;width:var(--contextw, auto)}";

const CONTEXT_OPEN_RULE_FIXED: &str = ".vis-fab-wrapper input:checked~.vis-fab-context{\
width:32px;height:150px;animation:vis-fac-animation 0.4s ease-out forwards 0.1s;top:-180px;\
opacity:1}";

const BUTTON_KEYFRAMES: &str = "@keyframes vis-fab-animation{0%{transform:rotate(0) scale(1)}\
20%{transform:rotate(60deg) scale(0.93)}55%{transform:rotate(35deg) scale(0.97)}\
80%{transform:rotate(48deg) scale(0.94)}100%{transform:rotate(45deg) scale(0.95)}}\
@keyframes vis-fab-animation-reverse{0%{transform:rotate(45deg) scale(0.95)}\
20%{transform:rotate(-15deg)}55%{transform:rotate(10deg)}80%{transform:rotate(-3deg)}\
100%{transform:rotate(0) scale(1)}}";

const CONTEXT_KEYFRAMES: &str = "@keyframes vis-fac-animation{0%{transform:scale(1, 1)}\
33%{transform:scale(0.95, 1.05)}66%{transform:scale(1.05, 0.95)}100%{transform:scale(1, 1)}}";

/// Stylesheet for an element built with `features`
///
/// A disabled feature keeps its elements styled with the fixed values; only
/// the custom properties that configure them are left out.
pub fn stylesheet(features: &FabFeatures) -> String {
    let mut css = String::with_capacity(4096);
    css.push_str(WRAPPER_RULE);
    css.push_str(if features.margins {
        WRAPPER_MARGINS
    } else {
        WRAPPER_MARGIN_FIXED
    });
    css.push_str(WRAPPER_ANCHOR);
    css.push_str(BUTTON_RULES);
    css.push_str(if features.context_panel {
        CONTEXT_RULES
    } else {
        CONTEXT_RULES_FIXED
    });
    css.push_str(TOGGLE_RULES);
    css.push_str(if features.context_panel {
        CONTEXT_OPEN_RULE
    } else {
        CONTEXT_OPEN_RULE_FIXED
    });
    css.push_str(BUTTON_KEYFRAMES);
    css.push_str(CONTEXT_KEYFRAMES);
    css
}
