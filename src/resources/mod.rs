use std::{fs, io, path::Path};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents a single rom with it's information
pub struct Rom {
    /// The rom name
    name: String,
    /// The raw program bytes, stored as a u8 slice on the heap
    data: Box<[u8]>,
}

impl Rom {
    /// Will generate a new rom based of the given data
    pub fn new(name: &str, data: Box<[u8]>) -> Self {
        Rom {
            name: name.to_string(),
            data,
        }
    }

    /// Reads the whole file as rom, the file stem is used as name.
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        log::info!("read rom {} with {} bytes", name, data.len());
        Ok(Rom {
            name,
            data: data.into_boxed_slice(),
        })
    }

    /// Will return a slice internal values of the given data
    pub fn get_data(&self) -> &[u8] {
        &self.data
    }

    /// Will return the name of the rom.
    pub fn get_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::Rom;
    use crate::opcode::{build_opcode, Opcode};
    use std::{env, fs, process};

    const RAW_ROM_DATA: [Opcode; 6] = [0x00E0, 0x6C00, 0x4C00, 0x6E0F, 0xA203, 0x6020];

    #[test]
    fn test_rom_new() {
        let rom = Rom::new("PONG", vec![0x12, 0x00].into_boxed_slice());
        assert_eq!("PONG", rom.get_name());
        assert_eq!(&[0x12u8, 0x00][..], rom.get_data());
    }

    #[test]
    fn test_rom_load() {
        let path = env::temp_dir().join(format!("octochip-{}-15PUZZLE.ch8", process::id()));
        let bytes: Vec<u8> = RAW_ROM_DATA.iter().flat_map(|op| op.to_be_bytes()).collect();
        fs::write(&path, &bytes).unwrap();

        let rom = Rom::load(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert!(rom.get_name().ends_with("15PUZZLE"));
        let data = rom.get_data();
        assert_eq!(RAW_ROM_DATA.len() * 2, data.len());

        for i in (0..data.len()).step_by(2) {
            let opcode = build_opcode(data, i).unwrap();
            assert_eq!(RAW_ROM_DATA[i / 2], opcode);
        }
    }

    #[test]
    fn test_rom_load_missing() {
        let path = env::temp_dir().join("octochip-does-not-exist.ch8");
        assert!(Rom::load(&path).is_err());
    }
}
