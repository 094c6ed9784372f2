use serde::Serialize;

use crate::cmd::LinkArgs;
use crate::exit::{op_error, CliResult, SUCCESS};
use crate::output::{print_list, OutputFormat};

#[derive(Serialize)]
struct I2cDevice {
    address: u8,
    hex: String,
}

pub fn run(link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = link.connect()?;
    let addresses = client
        .i2c()
        .scan()
        .map_err(|err| op_error("i2c scan", err))?;

    let devices: Vec<I2cDevice> = addresses
        .iter()
        .map(|&address| I2cDevice {
            address,
            hex: format!("0x{address:02X}"),
        })
        .collect();
    let rows = devices
        .iter()
        .map(|d| vec![d.hex.clone(), known_device(d.address).to_string()])
        .collect();
    print_list(&devices, &["ADDRESS", "LIKELY DEVICE"], rows, format);
    Ok(SUCCESS)
}

/// Common parts at fixed addresses on bridge boards.
fn known_device(address: u8) -> &'static str {
    match address {
        0x3C | 0x3D => "SSD1306 OLED",
        0x27 | 0x3F => "PCF8574 LCD backpack",
        0x57 => "AT24C32 EEPROM",
        0x68 => "DS3231 RTC",
        0x76 | 0x77 => "BME280",
        _ => "",
    }
}
