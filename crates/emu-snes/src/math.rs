//! CPU multiply/divide unit ($4202–$4206, $4214–$4217).
//!
//! Results are available immediately; the hardware's 8/16-cycle latency is
//! not modelled.

#[derive(Debug, Default, Clone)]
pub struct MathUnit {
    wrmpya: u8,
    dividend: u16,
    /// RDDIV: quotient.
    quotient: u16,
    /// RDMPY: product, or remainder after a divide.
    product: u16,
}

impl MathUnit {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// $4202 WRMPYA.
    pub fn write_wrmpya(&mut self, value: u8) {
        self.wrmpya = value;
    }

    /// $4203 WRMPYB. Starts the multiply.
    pub fn write_wrmpyb(&mut self, value: u8) {
        self.product = u16::from(self.wrmpya) * u16::from(value);
    }

    /// $4204 WRDIVL.
    pub fn write_wrdiv_low(&mut self, value: u8) {
        self.dividend = (self.dividend & 0xFF00) | u16::from(value);
    }

    /// $4205 WRDIVH.
    pub fn write_wrdiv_high(&mut self, value: u8) {
        self.dividend = (self.dividend & 0x00FF) | (u16::from(value) << 8);
    }

    /// $4206 WRDIVB. Starts the divide.
    pub fn write_wrdivb(&mut self, divisor: u8) {
        if divisor == 0 {
            self.quotient = 0xFFFF;
            self.product = self.dividend;
        } else {
            let divisor = u16::from(divisor);
            self.quotient = self.dividend / divisor;
            self.product = self.dividend % divisor;
        }
    }

    /// $4214/$4215 RDDIV.
    #[must_use]
    pub fn rddiv(&self) -> u16 {
        self.quotient
    }

    /// $4216/$4217 RDMPY.
    #[must_use]
    pub fn rdmpy(&self) -> u16 {
        self.product
    }
}
