extern crate winres;

fn main() {
  if cfg!(target_os = "windows") {
    let mut res = winres::WindowsResource::new();
    res.set("FileDescription", "HookWatch - Windows hook viewer");
    res.compile().unwrap();
  }
}
